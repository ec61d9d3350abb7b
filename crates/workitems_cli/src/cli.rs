use clap::{Parser, Subcommand};
use workitems_core::{ItemId, DEFAULT_GENERATED_CHILDREN};

#[derive(Parser, Debug)]
#[clap(
    name = "workitems",
    author,
    version,
    about = "Manage an Epic / Feature / Solution Intent / Story tree"
)]
pub struct Cli {
    /// Command to run; prints the tree when omitted
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the work-item tree
    Tree,

    /// Add a root epic
    AddEpic {
        /// Title of the epic
        #[clap(allow_hyphen_values = true)]
        title: String,
    },

    /// Add a feature under an epic
    AddFeature {
        /// Parent epic ID
        epic_id: ItemId,

        /// Title of the feature
        #[clap(allow_hyphen_values = true)]
        title: String,
    },

    /// Add a solution intent under an epic
    AddIntent {
        /// Parent epic ID
        epic_id: ItemId,

        /// Title of the solution intent
        #[clap(allow_hyphen_values = true)]
        title: String,
    },

    /// Add a story under a feature
    AddStory {
        /// Parent feature ID
        feature_id: ItemId,

        /// Title of the story
        #[clap(allow_hyphen_values = true)]
        title: String,
    },

    /// Generate placeholder features (FEATURE-<n>) under an epic
    GenerateFeatures {
        /// Parent epic ID
        epic_id: ItemId,

        /// Number of features to create
        #[clap(default_value_t = DEFAULT_GENERATED_CHILDREN)]
        count: usize,
    },

    /// Generate placeholder stories (STORY-<n>) under a feature
    GenerateStories {
        /// Parent feature ID
        feature_id: ItemId,

        /// Number of stories to create
        #[clap(default_value_t = DEFAULT_GENERATED_CHILDREN)]
        count: usize,
    },

    /// Replace the title of an item
    EditTitle {
        /// Item ID
        id: ItemId,

        /// New title
        #[clap(allow_hyphen_values = true)]
        title: String,
    },

    /// Show a one-line summary of an item
    Show {
        /// Item ID
        id: ItemId,
    },

    /// Delete an item and everything under it
    Delete {
        /// Item ID
        id: ItemId,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Delete every work item
    Reset {
        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

impl Command {
    /// Subcommand name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::AddEpic { .. } => "add-epic",
            Self::AddFeature { .. } => "add-feature",
            Self::AddIntent { .. } => "add-intent",
            Self::AddStory { .. } => "add-story",
            Self::GenerateFeatures { .. } => "generate-features",
            Self::GenerateStories { .. } => "generate-stories",
            Self::EditTitle { .. } => "edit-title",
            Self::Show { .. } => "show",
            Self::Delete { .. } => "delete",
            Self::Reset { .. } => "reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use workitems_core::ItemId;

    const ID: &str = "6f1c3a52-8d0e-4b8f-9a57-2f0b1c4d5e6f";

    fn parse(args: &[&str]) -> Option<Command> {
        Cli::try_parse_from(std::iter::once("workitems").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_tree() {
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&["tree"]), Some(Command::Tree));
    }

    #[test]
    fn delete_flag_may_come_before_or_after_the_id() {
        let id = ItemId::parse_str(ID).unwrap();
        let expected = Some(Command::Delete { id, yes: true });
        assert_eq!(parse(&["delete", "--yes", ID]), expected);
        assert_eq!(parse(&["delete", ID, "--yes"]), expected);
        assert_eq!(parse(&["delete", "-y", ID]), expected);
        assert_eq!(
            parse(&["delete", ID]),
            Some(Command::Delete { id, yes: false })
        );
    }

    #[test]
    fn titles_may_start_with_dashes() {
        assert_eq!(
            parse(&["add-epic", "--draft title"]),
            Some(Command::AddEpic {
                title: "--draft title".to_string()
            })
        );
        assert_eq!(
            parse(&["add-epic", "--", "-wip-"]),
            Some(Command::AddEpic {
                title: "-wip-".to_string()
            })
        );
    }

    #[test]
    fn generate_count_defaults_to_five() {
        let id = ItemId::parse_str(ID).unwrap();
        assert_eq!(
            parse(&["generate-features", ID]),
            Some(Command::GenerateFeatures {
                epic_id: id,
                count: 5
            })
        );
        assert_eq!(
            parse(&["generate-stories", ID, "2"]),
            Some(Command::GenerateStories {
                feature_id: id,
                count: 2
            })
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        let parse_err = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("workitems").chain(args.iter().copied()))
                .is_err()
        };
        assert!(parse_err(&["add-story", "not-an-id", "Title"]));
        assert!(parse_err(&["add-epic"]));
        assert!(parse_err(&["generate-features", ID, "many"]));
        assert!(parse_err(&["frobnicate"]));
    }
}
