/// Validate a webhook subscription handshake.
///
/// The platform probes the callback URL with `hub.mode=subscribe`, the
/// configured verify token and a random challenge. Returns the challenge to
/// echo back when mode and token both match, `None` otherwise.
#[must_use]
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    verify_token: &str,
) -> Option<String> {
    if mode != Some("subscribe") {
        tracing::warn!(?mode, "webhook verification with unexpected mode");
        return None;
    }
    if token != Some(verify_token) {
        tracing::warn!("webhook verification with mismatched token");
        return None;
    }
    challenge.map(str::to_owned)
}
