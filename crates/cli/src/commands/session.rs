//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! pm-cli session login -t <token> -p '{"id":1,"username":"alice","role":"ADMINISTRATOR"}'
//! pm-cli session points 1200
//! pm-cli session show
//! pm-cli session logout
//! ```

use points_mall_client::state::AppState;
use points_mall_core::UserProfile;
use serde_json::json;

use super::{CommandError, emit};

/// Store the token and, when given, the profile.
pub fn login(state: &AppState, token: String, profile: Option<&str>) -> Result<(), CommandError> {
    let profile = profile
        .map(serde_json::from_str::<UserProfile>)
        .transpose()?;

    state.session().set_token(token);
    if let Some(profile) = profile {
        tracing::info!(
            "Logged in as {} ({})",
            profile.display_name(),
            profile.role
        );
        state.session().set_user_info(profile);
    } else {
        tracing::info!("Token stored without profile");
    }
    Ok(())
}

/// Replace the points balance.
pub fn set_points(state: &AppState, points: i64) {
    state.session().set_points(points);
    tracing::info!("Points balance set to {points}");
}

/// Print the session. The token itself is never printed.
pub fn show(state: &AppState) -> Result<(), CommandError> {
    let session = state.session();
    emit(&json!({
        "authenticated": session.is_authenticated(),
        "userInfo": session.user_info(),
        "points": session.points(),
    }))
}

/// Clear the session.
pub fn logout(state: &AppState) {
    state.session().logout();
    tracing::info!("Logged out");
}
