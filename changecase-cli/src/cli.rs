// ABOUTME: CLI argument definitions for the change case management tool
// ABOUTME: Every flag mirrors an SF_CHANGE_CASE_* environment variable for CI use

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use url::Url;

use changecase_sdk::constants::status;
use changecase_sdk::{CaseSelector, Result};

#[derive(Parser, Debug)]
#[command(name = "sfchangecase")]
#[command(about = "Create, check, and close the change cases gating a release", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Skip the command entirely, exiting successfully
    #[arg(long, global = true, env = "SF_CHANGE_CASE_BYPASS")]
    pub bypass: bool,

    /// Resolve inputs and print the intended action without mutating the org
    #[arg(long, global = true, env = "SF_CHANGE_CASE_DRYRUN", alias = "dryrun")]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a change case is approved for release
    Check {
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// Create a change case from a template and start its implementation steps
    Create {
        /// Change case template to clone
        #[arg(short = 'i', long = "templateid", env = "SF_CHANGE_CASE_TEMPLATE_ID")]
        template_id: String,

        /// Scheduled build name the case belongs to
        #[arg(short = 'r', long, env = "SF_CHANGE_CASE_SCHEDULE_BUILD")]
        release: String,

        /// Source control location URL (overrides the template's)
        #[arg(short = 'l', long, env = "SF_CHANGE_CASE_REPO")]
        location: Option<Url>,
    },
    /// Stop the implementation steps and close a change case
    Close {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Status to stamp on the implementation steps
        #[arg(
            short = 's',
            long,
            env = "SF_CHANGE_CASE_STATUS",
            value_enum,
            default_value_t = StepStatus::ImplementedPerPlan
        )]
        status: StepStatus,
    },
    /// Set a change case status directly
    Update {
        /// Change case to update
        #[arg(short = 'i', long = "changecaseid", env = "SF_CHANGE_CASE_ID")]
        change_case_id: String,

        /// Status to set on the case
        #[arg(
            short = 's',
            long,
            env = "SF_CHANGE_CASE_STATUS",
            value_enum,
            default_value_t = CaseCloseStatus::DeploySuccessful
        )]
        status: CaseCloseStatus,
    },
    /// Tag a work item with a scheduled build
    UpdateScheduledBuild {
        /// Name of the work item to update
        #[arg(short = 'i', long = "workitemid", env = "SF_CHANGE_CASE_WORKITEM_ID")]
        work_item_id: String,

        /// Name of the scheduled build (must already exist)
        #[arg(
            short = 'b',
            long = "scheduledbuild",
            env = "SF_CHANGE_CASE_SCHEDULED_BUILD_NAME"
        )]
        scheduled_build: String,
    },
}

/// Shared case-selection flags: a direct id, or a (release, location) pair.
#[derive(Args, Debug, Clone)]
pub struct SelectorArgs {
    /// Change case id; release and location are ignored when provided
    #[arg(short = 'i', long = "changecaseid", env = "SF_CHANGE_CASE_ID")]
    pub change_case_id: Option<String>,

    /// Scheduled build name
    #[arg(short = 'r', long, env = "SF_CHANGE_CASE_SCHEDULE_BUILD", requires = "location")]
    pub release: Option<String>,

    /// Source control location URL
    #[arg(short = 'l', long, env = "SF_CHANGE_CASE_REPO", requires = "release")]
    pub location: Option<Url>,
}

impl SelectorArgs {
    pub fn to_selector(&self) -> Result<CaseSelector> {
        CaseSelector::from_parts(
            self.change_case_id.clone(),
            self.release.clone(),
            self.location.as_ref().map(|url| url.to_string()),
        )
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum StepStatus {
    #[value(name = "Implemented - per plan")]
    ImplementedPerPlan,
    #[value(name = "Not Implemented")]
    NotImplemented,
    #[value(name = "Rolled back - with no impact")]
    RolledBackNoImpact,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::ImplementedPerPlan => status::IMPLEMENTED_PER_PLAN,
            StepStatus::NotImplemented => status::NOT_IMPLEMENTED,
            StepStatus::RolledBackNoImpact => status::ROLLED_BACK_NO_IMPACT,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum CaseCloseStatus {
    #[value(name = "Closed - Deploy Successful")]
    DeploySuccessful,
    #[value(name = "Closed - Not Executed")]
    NotExecuted,
}

impl CaseCloseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseCloseStatus::DeploySuccessful => status::CLOSED_DEPLOY_SUCCESSFUL,
            CaseCloseStatus::NotExecuted => status::CLOSED_NOT_EXECUTED,
        }
    }
}

impl fmt::Display for CaseCloseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
