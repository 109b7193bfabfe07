use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use configs::MonitoringConfig;
use service::build_risk::BuildRiskAssessor;
use service::monitoring::MonitoringContext;
use service::task::{SeaOrmTaskRepository, TaskService};
use service::user::{SeaOrmUserRepository, UserService};

/// Shared handler state. Cloning is cheap; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskService<SeaOrmTaskRepository>>,
    pub users: Arc<UserService<SeaOrmUserRepository>>,
    pub monitoring: Arc<Mutex<MonitoringContext>>,
    pub build_risk: BuildRiskAssessor,
}

impl AppState {
    pub fn new(db: DatabaseConnection, monitoring: &MonitoringConfig) -> Self {
        Self {
            tasks: Arc::new(TaskService::new(Arc::new(SeaOrmTaskRepository {
                db: db.clone(),
            }))),
            users: Arc::new(UserService::new(Arc::new(SeaOrmUserRepository { db }))),
            monitoring: Arc::new(Mutex::new(MonitoringContext::from_config(monitoring))),
            build_risk: BuildRiskAssessor,
        }
    }
}
