use editor::Workbench;
use generator::GreedyGenerator;
use jobs::InMemJobs;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<GreedyGenerator>>,
    pub sessions: Sessions,
}

impl AppState {
    pub fn new_default() -> Self {
        Self {
            jobs: Arc::new(InMemJobs::new(GreedyGenerator::new())),
            sessions: Sessions::default(),
        }
    }
}

/// Open editing sessions. Each workbench sits behind its own async
/// mutex so place/move/delete are serialized per schedule; the shared
/// map lock is only held for lookups.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<String, Arc<Mutex<Workbench>>>>>,
}

impl Sessions {
    pub fn open(&self, workbench: Workbench) -> String {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(workbench)));
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Workbench>>> {
        self.inner.read().get(id).cloned()
    }

    pub fn close(&self, id: &str) -> bool {
        self.inner.write().remove(id).is_some()
    }
}
