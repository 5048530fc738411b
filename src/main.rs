use std::process::ExitCode;

use course_assessment::{app_state::AppState, config::Config, services::pipeline};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(course_id) = args.next() else {
        eprintln!("usage: course-assessment <course_id> [question_count]");
        return ExitCode::from(2);
    };
    let requested_count = match args.next().map(|raw| raw.parse::<usize>()) {
        None => pipeline::DEFAULT_QUESTION_COUNT,
        Some(Ok(count)) => count,
        Some(Err(e)) => {
            eprintln!("question_count must be a positive integer: {}", e);
            return ExitCode::from(2);
        }
    };

    let config = Config::from_env();
    config.log_provider_status();

    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialise: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match state
        .pipeline
        .generate_for_course_id(&course_id, requested_count)
        .await
    {
        Ok(assessment) => match serde_json::to_string_pretty(&assessment) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to serialise assessment: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            let report = e.to_report();
            log::error!("Assessment generation failed at {}: {}", report.stage, report.reason);
            if let Ok(json) = serde_json::to_string_pretty(&report) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
