use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use bookify::client::{BookingForm, HttpTransport, Outcome, RetryPolicy, SubmissionClient};
use bookify::rules::{Field, INTEREST_OPTIONS, ROOM_TYPE_OPTIONS};

/// Fill in a booking and submit it, or list existing bookings.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Base URL of the booking server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Print every booking instead of submitting one
    #[arg(long)]
    list: bool,

    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    nationality: String,
    #[arg(long, default_value = "")]
    university: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    birth_date: String,
    #[arg(long, default_value = "", help = interest_help())]
    interest: String,
    #[arg(long, default_value = "", help = room_type_help())]
    room_type: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    arrival_date: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    departure_date: String,
    #[arg(long, default_value = "")]
    comments: String,

    #[arg(long, default_value_t = 3)]
    max_attempts: u32,
    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
    /// Wait between attempts in seconds
    #[arg(long, default_value_t = 10)]
    retry_delay_secs: u64,
}

fn interest_help() -> String {
    format!("One of: {}", INTEREST_OPTIONS.join(", "))
}

fn room_type_help() -> String {
    format!("One of: {}", ROOM_TYPE_OPTIONS.join(", "))
}

impl Args {
    fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            attempt_timeout: Duration::from_secs(self.timeout_secs),
            retry_delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    fn fields(&self) -> [(Field, &str); 11] {
        [
            (Field::FirstName, self.first_name.as_str()),
            (Field::LastName, self.last_name.as_str()),
            (Field::Email, self.email.as_str()),
            (Field::Nationality, self.nationality.as_str()),
            (Field::University, self.university.as_str()),
            (Field::BirthDate, self.birth_date.as_str()),
            (Field::Interest, self.interest.as_str()),
            (Field::RoomType, self.room_type.as_str()),
            (Field::ArrivalDate, self.arrival_date.as_str()),
            (Field::DepartureDate, self.departure_date.as_str()),
            (Field::Comments, self.comments.as_str()),
        ]
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let transport = match HttpTransport::new(&args.api_url) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.list {
        return list(&transport).await;
    }

    let mut form = BookingForm::new(SubmissionClient::new(transport, args.policy()));
    for (field, value) in args.fields() {
        form.set_field(field, value);
    }

    let outcome = form
        .submit_with_progress(|progress| eprintln!("{}", progress.message()))
        .await;
    match &outcome {
        Outcome::Invalid(errors) | Outcome::Rejected(errors) => {
            eprintln!("{}", form.message());
            if matches!(outcome, Outcome::Invalid(_)) {
                for error in errors.iter() {
                    match error.field {
                        Some(field) => {
                            eprintln!("  --{}: {}", field.key().replace('_', "-"), error.message)
                        }
                        None => eprintln!("  {}", error.message),
                    }
                }
            }
            ExitCode::FAILURE
        }
        Outcome::ExhaustedRetries { .. } | Outcome::Aborted(_) => {
            eprintln!("{}", form.message());
            ExitCode::FAILURE
        }
        Outcome::Success { .. } => {
            println!("{}", form.message());
            ExitCode::SUCCESS
        }
    }
}

async fn list(transport: &HttpTransport) -> ExitCode {
    match transport.list_bookings().await {
        Ok(bookings) => {
            for b in &bookings {
                println!(
                    "#{} {} {} <{}> {} {}..{} {}",
                    b.id,
                    b.first_name,
                    b.last_name,
                    b.email,
                    b.room_type,
                    b.arrival_date,
                    b.departure_date,
                    b.created_at
                );
            }
            println!("{} booking(s)", bookings.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: could not list bookings: {e}");
            ExitCode::FAILURE
        }
    }
}
