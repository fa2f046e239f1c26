use harvest_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, HarvestFault, RedditApiError,
};
use std::io;

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let io_error = CoreError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    assert_eq!(io_error.error_code(), "IO");

    let config_error = CoreError::Config(ConfigError::PlaceholderCredential {
        field: "client_id".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let invalid_post = CoreError::InvalidPost {
        id: String::new(),
        reason: "post has no id".to_string(),
    };
    assert_eq!(invalid_post.error_code(), "INVALID_POST");
}

#[test]
fn test_reddit_error_codes() {
    assert_eq!(
        RedditApiError::SubredditNotFound {
            subreddit: "blueprint_".to_string()
        }
        .error_code(),
        "REDDIT_SUBREDDIT_NOT_FOUND"
    );
    assert_eq!(
        RedditApiError::RateLimitExceeded { retry_after: 60 }.error_code(),
        "REDDIT_RATE_LIMIT"
    );
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "client_secret".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("client_secret"));

    let placeholder = ConfigError::PlaceholderCredential {
        field: "client_id".to_string(),
    };
    assert!(placeholder
        .user_friendly_message()
        .contains("Reddit API credentials"));

    let io_error = CoreError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
    let message = io_error.user_friendly_message();
    assert!(message.contains("gone"));
    assert!(!message.contains("output file"));

    let unreadable = ConfigError::Unreadable {
        path: "harvest.toml".to_string(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(unreadable.user_friendly_message().contains("harvest.toml"));
    assert_eq!(unreadable.error_code(), "CONFIG_UNREADABLE");
}

#[test]
fn test_fault_messages_carry_partial_count() {
    let fault = HarvestFault::Collection {
        collected: 120,
        source: CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 }),
    };
    assert_eq!(fault.error_code(), "HARVEST_COLLECTION");
    assert!(fault.user_friendly_message().contains("120 posts"));

    let fault = HarvestFault::Connectivity {
        community: "blueprint_".to_string(),
        source: CoreError::RedditApi(RedditApiError::SubredditNotFound {
            subreddit: "blueprint_".to_string(),
        }),
    };
    assert!(fault.to_string().contains("r/blueprint_"));
    assert!(fault.user_friendly_message().contains("not found"));
}

#[test]
fn test_error_conversions() {
    let core: CoreError = RedditApiError::RequestTimeout.into();
    assert!(matches!(
        core,
        CoreError::RedditApi(RedditApiError::RequestTimeout)
    ));

    let core: CoreError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
    assert!(matches!(core, CoreError::Io(_)));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
