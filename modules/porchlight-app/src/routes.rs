//! The route table. Registration order is load-bearing: when two
//! patterns match, the earlier one handles the request.

use std::sync::Arc;

use porchlight_web::Router;

use crate::config::Config;
use crate::handlers::{auth, pages, register};
use crate::middleware::{RequestLog, RequireAuth, SessionLoader};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>, config: &Config) -> Router {
    let mut router = Router::new();
    router.set_dev_mode(config.dev_mode);

    // Global middleware sees every request, matched or not.
    router.use_middleware(Arc::new(RequestLog));
    router.use_middleware(Arc::new(SessionLoader::new(state.sessions.clone())));

    router.get("/", pages::home, vec![]);

    router.get("/register", register::form, vec![]);
    let st = state.clone();
    router.post("/register", move |ctx| register::submit(st.clone(), ctx), vec![]);

    router.get("/login", auth::login_form, vec![]);
    let st = state.clone();
    router.post("/login", move |ctx| auth::login_submit(st.clone(), ctx), vec![]);
    let st = state.clone();
    router.post("/logout", move |ctx| auth::logout(st.clone(), ctx), vec![]);

    let st = state.clone();
    router.group("/dashboard", vec![Arc::new(RequireAuth::new())], |g| {
        g.get("", move |ctx| pages::dashboard(st.clone(), ctx), vec![]);
    });

    router.static_files("/static", &config.static_dir);

    router
}
