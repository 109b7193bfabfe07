use std::collections::BTreeMap;

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct TaskDoc {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(ToSchema)]
pub struct NewTaskDoc {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Omitted fields are kept; `"description": null` clears the description.
#[derive(ToSchema)]
pub struct TaskChangesDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(ToSchema)]
pub struct NewUserDoc {
    pub name: String,
    pub email: String,
}

#[derive(ToSchema)]
pub struct UserChangesDoc {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(ToSchema)]
pub struct MetricSampleDoc {
    pub name: String,
    pub value: f64,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct AnomalyVerdictDoc {
    pub is_anomaly: bool,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: i64,
}

/// Changed file name to number of changed lines.
#[derive(ToSchema)]
pub struct ChangeSetDoc(pub BTreeMap<String, u32>);

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BuildRiskAssessmentDoc {
    pub overall_risk_score: f64,
    /// `LIKELY_FAIL` or `LIKELY_SUCCESS`.
    pub predicted_outcome: String,
    pub component_risks: BTreeMap<String, String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct IncidentPredictionDoc {
    pub metric_name: String,
    pub current_value: f64,
    pub average_change_rate: f64,
    pub predicted_incident: String,
    /// `LOW`, `MEDIUM` or `HIGH`.
    pub severity: String,
    pub eta_minutes: Option<u32>,
    pub recommended_action: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::tasks::list,
        crate::routes::tasks::get,
        crate::routes::tasks::create,
        crate::routes::tasks::update,
        crate::routes::tasks::delete,
        crate::routes::users::list,
        crate::routes::users::get,
        crate::routes::users::create,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::monitoring::detect_anomaly,
        crate::routes::monitoring::assess_build_risk,
        crate::routes::monitoring::submit_metric,
        crate::routes::monitoring::incidents,
    ),
    components(
        schemas(
            TaskDoc,
            NewTaskDoc,
            TaskChangesDoc,
            UserDoc,
            NewUserDoc,
            UserChangesDoc,
            MetricSampleDoc,
            AnomalyVerdictDoc,
            ChangeSetDoc,
            BuildRiskAssessmentDoc,
            IncidentPredictionDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "tasks", description = "Task CRUD"),
        (name = "users", description = "User CRUD"),
        (name = "monitoring", description = "Anomaly detection, incident forecasting and build risk"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = [
            "/health",
            "/api/tasks",
            "/api/tasks/{id}",
            "/api/users/{id}",
            "/api/ai/detect-anomaly",
            "/api/monitoring/incidents",
        ];
        for path in paths {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
