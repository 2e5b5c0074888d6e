//! Configuration types.
//!
//! Values come from GitHub Action inputs, which the runner exposes as
//! `INPUT_<NAME>` environment variables (name upper-cased, hyphens kept).

use secrecy::SecretString;

use crate::error::ConfigError;

pub const INPUT_CARD_ID_PATTERN: &str = "trello-card-id-pattern";
pub const INPUT_API_KEY: &str = "trello-api-key";
pub const INPUT_AUTH_TOKEN: &str = "trello-auth-token";
pub const INPUT_BOARD_ID: &str = "trello-board-id";
pub const INPUT_CARD_ACTION: &str = "trello-card-action";
pub const INPUT_LIST_COMMIT: &str = "trello-list-name-commit";
pub const INPUT_LIST_PR_OPEN: &str = "trello-list-name-pr-open";
pub const INPUT_LIST_PR_CLOSED: &str = "trello-list-name-pr-closed";
pub const INPUT_MAX_COMMIT_DEPTH: &str = "git-max-commit-depth";

/// Default prefix in front of card numbers, e.g. `#12`.
pub const DEFAULT_CARD_ID_PATTERN: &str = "#";

/// Default number of commits read from history.
pub const DEFAULT_MAX_COMMIT_DEPTH: usize = 1;

/// Side effect applied to every referenced card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// Attach the event URL as a link.
    Attachment,
    /// Post `"{user}: {message} {url}"` as a comment.
    Comment,
    /// No action input given. Cards are still moved, but nothing is written.
    NotConfigured,
    /// Anything else. Treated like `NotConfigured`.
    Unsupported(String),
}

impl CardAction {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "attachment" => CardAction::Attachment,
            "comment" => CardAction::Comment,
            _ => CardAction::Unsupported(value.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CardAction::Attachment => "attachment",
            CardAction::Comment => "comment",
            CardAction::NotConfigured => "none",
            CardAction::Unsupported(raw) => raw,
        }
    }
}

/// Which sources of a pull request / issue must carry a card reference.
///
/// Whether both the title and the branch must reference a card, or only one
/// of them, is undecided product-wise. `TitleAndBranch` keeps the strict
/// behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceRequirement {
    /// Every provided source must yield at least one id.
    #[default]
    TitleAndBranch,
    /// Only the union of all sources must be non-empty.
    TitleOrBranch,
}

/// Trello target list names. `None` means no move for that event kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListNames {
    pub commit: Option<String>,
    pub pull_request_open: Option<String>,
    pub pull_request_closed: Option<String>,
}

/// Full configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Literal prefix in front of card numbers.
    pub card_id_pattern: String,
    pub api_key: SecretString,
    pub auth_token: SecretString,
    pub board_id: String,
    pub card_action: CardAction,
    pub lists: ListNames,
    pub max_commit_depth: usize,
    pub reference_requirement: ReferenceRequirement,
}

impl SyncConfig {
    /// Build a config from GitHub Action inputs in the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(input_env_var(name)).ok())
    }

    /// Build a config from an arbitrary input lookup (keyed by input name).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &str, hint: &str| {
            get(name).ok_or_else(|| ConfigError::MissingRequired {
                key: name.to_string(),
                hint: hint.to_string(),
            })
        };

        let api_key = required(INPUT_API_KEY, "Create one at https://trello.com/app-key")?;
        let auth_token = required(INPUT_AUTH_TOKEN, "Generate a token for the API key")?;
        let board_id = required(INPUT_BOARD_ID, "Use the id or short link of the board")?;

        let max_commit_depth = match get(INPUT_MAX_COMMIT_DEPTH) {
            None => DEFAULT_MAX_COMMIT_DEPTH,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: INPUT_MAX_COMMIT_DEPTH.to_string(),
                        message: format!("expected a positive integer, got {raw:?}"),
                    });
                }
            },
        };

        let card_action = match get(INPUT_CARD_ACTION) {
            None => {
                tracing::debug!("No card action configured; cards will only be moved");
                CardAction::NotConfigured
            }
            Some(raw) => {
                let action = CardAction::parse(&raw);
                if let CardAction::Unsupported(raw) = &action {
                    tracing::warn!(
                        action = %raw,
                        "Unrecognized card action; cards will be moved but not annotated"
                    );
                }
                action
            }
        };

        Ok(Self {
            card_id_pattern: get(INPUT_CARD_ID_PATTERN)
                .unwrap_or_else(|| DEFAULT_CARD_ID_PATTERN.to_string()),
            api_key: SecretString::from(api_key),
            auth_token: SecretString::from(auth_token),
            board_id,
            card_action,
            lists: ListNames {
                commit: get(INPUT_LIST_COMMIT),
                pull_request_open: get(INPUT_LIST_PR_OPEN),
                pull_request_closed: get(INPUT_LIST_PR_CLOSED),
            },
            max_commit_depth,
            reference_requirement: ReferenceRequirement::default(),
        })
    }

    pub fn with_reference_requirement(mut self, requirement: ReferenceRequirement) -> Self {
        self.reference_requirement = requirement;
        self
    }
}

/// Environment variable the Actions runner uses for an input.
pub fn input_env_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Browser URL of the repository, from `GITHUB_SERVER_URL` and
/// `GITHUB_REPOSITORY`. `None` outside of GitHub Actions.
pub fn repository_url<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let repository = lookup("GITHUB_REPOSITORY").filter(|r| !r.is_empty())?;
    let server = lookup("GITHUB_SERVER_URL")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "https://github.com".to_string());
    Some(format!("{}/{repository}", server.trim_end_matches('/')))
}
