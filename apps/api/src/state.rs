use nightschool_application::ChatService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: ChatService,
}
