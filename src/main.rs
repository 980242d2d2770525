//! Credit Scoring Dashboard - Main Entry Point
//!
//! One operator action per run; every view is printed as JSON.
//!
//! ```text
//! credit-dashboard <manual [--form JSON]|existing ID|random>
//!                  [--set FIELD=VALUE]... [--explain] [--global]
//!                  [--compare COLUMN] [--scatter X Y]
//! ```
//!
//! `--set` edits the selected applicant before scoring, e.g.
//! `existing 12 --set credit_amount=450000 --set education="Higher education"`.

use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

use credit_dashboard::api::{ApplicantForm, ClientSelection, Dashboard};
use credit_dashboard::constants;
use credit_dashboard::logic::config::DashboardConfig;
use credit_dashboard::logic::{dataset, model};
use credit_dashboard::logic::prediction::ScoringClient;

const USAGE: &str = "usage: credit-dashboard <manual [--form JSON]|existing ID|random> [--set FIELD=VALUE]... [--explain] [--global] [--compare COLUMN] [--scatter X Y]";

#[derive(Debug, Default)]
struct Args {
    selection: Option<ClientSelection>,
    form: Option<ApplicantForm>,
    overrides: Vec<(String, String)>,
    explain: bool,
    global: bool,
    compare: Option<String>,
    scatter: Option<(String, String)>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "manual" => {
                parsed.selection = Some(ClientSelection::Manual { form: ApplicantForm::default() })
            }
            "random" => parsed.selection = Some(ClientSelection::Random),
            "existing" => {
                let id = args.next().context("existing needs a client ID")?;
                let id = id.parse().with_context(|| format!("invalid client ID '{}'", id))?;
                parsed.selection = Some(ClientSelection::Existing { id });
            }
            "--form" => {
                let raw = args.next().context("--form needs a JSON object")?;
                let form: ApplicantForm =
                    serde_json::from_str(&raw).context("--form is not a valid applicant form")?;
                parsed.form = Some(form);
            }
            "--set" => {
                let pair = args.next().context("--set needs FIELD=VALUE")?;
                let (field, value) = pair
                    .split_once('=')
                    .with_context(|| format!("--set expects FIELD=VALUE, got '{}'", pair))?;
                parsed.overrides.push((field.trim().to_string(), value.trim().to_string()));
            }
            "--explain" => parsed.explain = true,
            "--global" => parsed.global = true,
            "--compare" => parsed.compare = Some(args.next().context("--compare needs a column")?),
            "--scatter" => {
                let x = args.next().context("--scatter needs two columns")?;
                let y = args.next().context("--scatter needs two columns")?;
                parsed.scatter = Some((x, y));
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => bail!("unknown argument '{}'\n{}", other, USAGE),
        }
    }

    if let Some(form) = parsed.form.take() {
        match parsed.selection {
            None | Some(ClientSelection::Manual { .. }) => {
                parsed.selection = Some(ClientSelection::Manual { form })
            }
            Some(_) => bail!("--form only applies to manual mode (use --set to edit a client)"),
        }
    }
    if parsed.selection.is_none() {
        bail!("{}", USAGE);
    }
    Ok(parsed)
}

/// Apply `--set` edits in order
fn apply_overrides(form: ApplicantForm, overrides: &[(String, String)]) -> Result<ApplicantForm> {
    overrides.iter().try_fold(form, |form, (field, value)| {
        form.with_field(field, value).map_err(anyhow::Error::msg)
    })
}

/// View on success, `{"error": message}` otherwise
fn view<T: serde::Serialize>(result: Result<T, String>) -> Value {
    match result {
        Ok(v) => serde_json::to_value(v).unwrap_or_else(|e| json!({ "error": e.to_string() })),
        Err(message) => {
            log::warn!("{}", message);
            json!({ "error": message })
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let args = parse_args(std::env::args().skip(1))?;
    let config = DashboardConfig::from_env();

    let reference = dataset::load_with(&config.dataset)
        .with_context(|| format!("loading reference data from {}", config.dataset.url))?;
    let model = model::load_model_with(&config.model)
        .with_context(|| format!("loading model from {}", config.model.path.display()))?;

    let scoring = ScoringClient::new(config.scoring);
    log::info!(
        "Scoring endpoint: {} (timeout {}s)",
        scoring.endpoint(),
        scoring.timeout().as_secs()
    );
    let dashboard = Dashboard::new(reference, model, scoring);

    let mut output = Map::new();
    let selection = args.selection.context("no client selection")?;
    let mut form = dashboard.select_client(selection).map_err(anyhow::Error::msg)?;
    let prefilled_from = dashboard.session().client_id;

    if !args.overrides.is_empty() {
        let edited = apply_overrides(form, &args.overrides)?;
        form = dashboard
            .select_client(ClientSelection::Manual { form: edited })
            .map_err(anyhow::Error::msg)?;
    }

    output.insert("client".into(), json!({
        "prefilled_from": prefilled_from,
        "edited": !args.overrides.is_empty(),
        "gender": form.gender_label(),
        "form": form,
    }));

    output.insert("score".into(), view(dashboard.predict()));

    if args.explain {
        output.insert("local_explanation".into(), view(dashboard.explain_local()));
    }
    if args.global {
        output.insert("global_explanation".into(), view(dashboard.explain_global()));
    }
    if let Some(column) = &args.compare {
        output.insert("comparison".into(), view(dashboard.compare_feature(column)));
    }
    if let Some((x, y)) = &args.scatter {
        output.insert("scatter".into(), view(dashboard.compare_features(x, y)));
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_dashboard::api::Education;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_manual_with_form() {
        let args = parse(&["manual", "--form", r#"{"credit_amount":120000,"owns_car":1}"#]).unwrap();
        match args.selection {
            Some(ClientSelection::Manual { form }) => {
                assert_eq!(form.credit_amount, 120_000);
                assert_eq!(form.owns_car, 1);
                assert_eq!(form.income_total, 50_000);
            }
            other => panic!("expected manual selection, got {:?}", other),
        }

        // --form alone implies manual
        let args = parse(&["--form", "{}"]).unwrap();
        assert_eq!(
            args.selection,
            Some(ClientSelection::Manual { form: ApplicantForm::default() })
        );
    }

    #[test]
    fn test_form_rejected_outside_manual() {
        assert!(parse(&["existing", "3", "--form", "{}"]).is_err());
        assert!(parse(&["manual", "--form", "not json"]).is_err());
        assert!(parse(&["manual", "--form", r#"{"education":"PhD"}"#]).is_err());
    }

    #[test]
    fn test_set_overrides_applied_in_order() {
        let args = parse(&[
            "existing", "12",
            "--set", "credit_amount=450000",
            "--set", "education=Higher education",
            "--set", "credit_amount=300000",
            "--explain",
        ])
        .unwrap();
        assert_eq!(args.selection, Some(ClientSelection::Existing { id: 12 }));
        assert!(args.explain);
        assert_eq!(args.overrides.len(), 3);

        let form = apply_overrides(ApplicantForm::default(), &args.overrides).unwrap();
        assert_eq!(form.credit_amount, 300_000);
        assert_eq!(form.education, Education::Higher);

        let bad = vec![("nope".to_string(), "1".to_string())];
        assert!(apply_overrides(ApplicantForm::default(), &bad).is_err());
    }

    #[test]
    fn test_argument_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["random", "--set", "credit_amount"]).is_err());
        assert!(parse(&["existing", "abc"]).is_err());
        assert!(parse(&["random", "--bogus"]).is_err());
        assert_eq!(
            parse(&["random", "--scatter", "A", "B"]).unwrap().scatter,
            Some(("A".to_string(), "B".to_string()))
        );
    }
}
