use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Todos,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        match path.trim_matches('/') {
            "login" => Some(Route::Login),
            "register" => Some(Route::Register),
            "todos" => Some(Route::Todos),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Todos => "/todos",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Todos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny { redirect_to: Route },
}

/// Gate for the task list view: allowed iff a token is present right now.
pub fn can_activate(session: &SessionManager) -> Access {
    if session.is_logged_in() {
        Access::Allow
    } else {
        Access::Deny {
            redirect_to: Route::Login,
        }
    }
}

/// Resolves a navigation attempt to the route that is actually shown.
/// The empty path goes to the login page; unknown paths resolve to nothing.
pub fn navigate(path: &str, session: &SessionManager) -> Option<Route> {
    if path.trim_matches('/').is_empty() {
        return Some(Route::Login);
    }

    let route = Route::parse(path)?;
    if !route.is_protected() {
        return Some(route);
    }

    match can_activate(session) {
        Access::Allow => Some(route),
        Access::Deny { redirect_to } => Some(redirect_to),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::parse_api_url;
    use crate::session::SESSION_KEY;
    use crate::storage::{KeyValueStore, MemoryStore, StoreHandle};

    fn session(logged_in: bool) -> SessionManager {
        let store: StoreHandle = Arc::new(MemoryStore::new());
        if logged_in {
            store
                .set(SESSION_KEY, &json!({"token": "abc", "user": {}}).to_string())
                .unwrap();
        }
        let api = ApiClient::new(parse_api_url("http://127.0.0.1:9/api").unwrap()).unwrap();
        SessionManager::restore(api, store)
    }

    #[test]
    fn denies_without_token() {
        assert_eq!(
            can_activate(&session(false)),
            Access::Deny {
                redirect_to: Route::Login
            }
        );
        assert_eq!(navigate("/todos", &session(false)), Some(Route::Login));
    }

    #[test]
    fn allows_with_token() {
        assert_eq!(can_activate(&session(true)), Access::Allow);
        assert_eq!(navigate("/todos", &session(true)), Some(Route::Todos));
    }

    #[test]
    fn denies_right_after_logout() {
        let session = session(true);
        session.logout();
        assert!(matches!(can_activate(&session), Access::Deny { .. }));
    }

    #[test]
    fn public_and_unknown_routes() {
        let session = session(false);
        assert_eq!(navigate("", &session), Some(Route::Login));
        assert_eq!(navigate("/register", &session), Some(Route::Register));
        assert_eq!(navigate("/nowhere", &session), None);
    }
}
