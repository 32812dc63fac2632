//! Check command: classify one message.

use spamscope::{Settings, SpamCheck};

use crate::backend::classifier;
use crate::cli::CheckArgs;
use crate::output::{OutputFormat, print_json};

/// Run the check command
pub async fn run(
    args: &CheckArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (None, None) => return Err("provide a message or --file".into()),
    };
    if text.trim().is_empty() {
        return Err("message is empty".into());
    }

    let api = classifier(settings)?;
    let mut check = SpamCheck::new();
    let Some(result) = check.check(&api, &text).await else {
        eprintln!("Classification failed; see the log for details");
        std::process::exit(1);
    };

    match format {
        OutputFormat::Human => {
            println!("Verdict:     {}", result.verdict.as_str().to_uppercase());
            println!(
                "Confidence:  {:.1}% ({})",
                result.confidence() * 100.0,
                result.band().as_str()
            );
            println!("Ham:         {:.1}%", result.ham_probability() * 100.0);
            println!("Spam:        {:.1}%", result.spam_probability() * 100.0);
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "verdict": result.verdict,
            "predicted_class": result.verdict.class(),
            "confidence": result.confidence(),
            "band": result.band().as_str(),
            "probabilities": result.probabilities,
        }))?,
    }
    Ok(())
}
