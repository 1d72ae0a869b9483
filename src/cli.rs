use crate::router::Route;
use clap::{Parser, Subcommand};
use emr_core::dashboard::MAX_INTAKE_MONTHS;

#[derive(Parser, Debug)]
#[command(name = "emr")]
#[command(about = "EMR dashboard for doctors: patients, files and the AI assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in with a doctor account
    Login {
        /// Account email
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Request a password reset email
    ForgotPassword {
        /// Account email
        email: String,
    },
    /// Set a new password with the token from the reset email
    ResetPassword {
        /// Reset token
        token: String,
        /// New password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Password confirmation (prompted for when omitted)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Dashboard statistics
    Dashboard {
        /// Length of the monthly intake series
        #[arg(
            long,
            default_value_t = 6,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_INTAKE_MONTHS))
        )]
        months: u32,
    },
    /// List patients
    Patients(PatientsArgs),
    /// Show one patient
    Patient {
        /// Patient id
        id: String,
        /// Include medical records
        #[arg(long)]
        records: bool,
        /// Include attached files
        #[arg(long)]
        files: bool,
        /// Print the raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Update contact details of a patient
    UpdatePatient(UpdatePatientArgs),
    /// Browse general files
    Files {
        /// Only files in this folder
        #[arg(long)]
        folder: Option<String>,
        /// Only files whose name contains this text
        #[arg(long)]
        search: Option<String>,
        /// List folders with their file counts instead of files
        #[arg(long)]
        folders: bool,
    },
    /// Download a file by its storage key
    Download {
        /// Storage key of the object
        key: String,
        /// Filename to save as (defaults to the last part of the key)
        #[arg(long)]
        name: Option<String>,
    },
    /// Ask the AI assistant (interactive when no message is given)
    Chat {
        /// Message to send
        message: Option<String>,
    },
    /// Open a dashboard path such as /patients/p1
    Open {
        path: String,
    },
    /// Check that the backend is reachable
    Health,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct PatientsArgs {
    /// Backend search (name, phone, citizen id)
    #[arg(long)]
    pub search: Option<String>,
    /// Page number, from 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Page size
    #[arg(long, default_value_t = api_shared::pagination::DEFAULT_PAGE_SIZE)]
    pub limit: u32,
    /// Group every matching patient into time folders: day, week, month or year
    #[arg(long)]
    pub group: Option<String>,
    /// Show only the members of one folder, e.g. "Tháng 01/2024"
    #[arg(long, requires = "group")]
    pub folder: Option<String>,
    /// Filter by gender (nam, nữ, khác)
    #[arg(long)]
    pub gender: Option<String>,
    /// Filter by blood type (A+, O-, ...)
    #[arg(long)]
    pub blood_type: Option<String>,
    /// Print the raw JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for PatientsArgs {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            limit: api_shared::pagination::DEFAULT_PAGE_SIZE,
            group: None,
            folder: None,
            gender: None,
            blood_type: None,
            json: false,
        }
    }
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatePatientArgs {
    /// Patient id
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Assigned doctor
    #[arg(long)]
    pub doctor: Option<String>,
    /// Allergies, comma-separated
    #[arg(long)]
    pub allergies: Option<String>,
}

impl Command {
    /// The page a command renders, or `None` for commands that need no gating.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::ForgotPassword { .. } => Some(Route::ForgotPassword),
            Command::ResetPassword { .. } => Some(Route::ResetPassword),
            Command::Whoami | Command::Dashboard { .. } => Some(Route::Home),
            Command::Patients(_) => Some(Route::Patients),
            Command::Patient { id, .. } | Command::UpdatePatient(UpdatePatientArgs { id, .. }) => {
                Some(Route::Patient(id.clone()))
            }
            Command::Files { .. } | Command::Download { .. } => Some(Route::GeneralFiles),
            Command::Chat { .. } => Some(Route::Chat),
            Command::Open { path } => Route::parse(path),
            Command::Logout | Command::Health => None,
        }
    }
}
