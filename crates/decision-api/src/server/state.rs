/// Handlers only read from the facade, so the state carries no lock.
#[derive(Clone)]
struct AppState {
    api: Arc<DecisionApi>,
}

impl AppState {
    fn new(api: DecisionApi) -> Self {
        Self { api: Arc::new(api) }
    }
}
