use crate::app::command_support::{event_log, load_settings};
use crate::provider::OpenAiCompatClient;
use serde_json::Value;

pub fn cmd_health(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: health".to_string());
    }

    let settings = load_settings()?;
    let log = event_log(&settings);
    let client = OpenAiCompatClient::new(&settings.model).map_err(|e| e.to_string())?;
    let models = match client.check_connection() {
        Ok(models) => models,
        Err(err) => {
            log.error(
                "health_check_failed",
                &err.to_string(),
                &[("endpoint", Value::String(client.api_base().to_string()))],
            );
            return Err(format!(
                "model server at {} is unreachable: {err}",
                client.api_base()
            ));
        }
    };

    let served = models.iter().any(|id| id == &settings.model.model);
    log.info(
        "health_check_passed",
        "model server reachable",
        &[
            ("endpoint", Value::String(client.api_base().to_string())),
            ("models", Value::from(models.len())),
        ],
    );
    Ok(format!(
        "endpoint={}\nreachable=true\nmodel={}\nmodel_served={}\nserved_models={}",
        client.api_base(),
        settings.model.model,
        served,
        if models.is_empty() {
            "none".to_string()
        } else {
            models.join(",")
        }
    ))
}
