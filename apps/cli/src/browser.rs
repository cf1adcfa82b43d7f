//! Client engine detection for the drag-and-drop path.

/// Whether the engine identified by `user_agent` delivers dropped files.
/// Safari does not; Chrome and Android builds mention "Safari" in their user
/// agent too, so they are excluded when they appear before it.
pub fn supports_file_drop(user_agent: &str) -> bool {
    !is_safari(user_agent)
}

/// Case-insensitive equivalent of `^((?!chrome|android).)*safari`.
pub fn is_safari(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    match ua.find("safari") {
        Some(pos) => {
            let prefix = &ua[..pos];
            !prefix.contains("chrome") && !prefix.contains("android")
        }
        None => false,
    }
}
