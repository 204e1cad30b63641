//! Summary service
//!
//! Turns the statistics into a short conversational forecast through the
//! hosted text model.

use std::{fmt, sync::Arc, time::Instant};

use domain::{StatsBundle, WeatherVariable};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::{error::ApplicationError, ports::InferencePort};

/// Statistics as the prompt embeds them: `{"<key>": {"media": .., "prob": ..}}`
pub fn stats_payload(stats: &StatsBundle) -> Value {
    let entries: Map<String, Value> = WeatherVariable::ALL
        .into_iter()
        .map(|variable| {
            let s = stats.get(variable);
            (
                variable.key().to_string(),
                json!({ "media": s.mean, "prob": s.probability }),
            )
        })
        .collect();
    Value::Object(entries)
}

/// Milliseconds since `start`, saturating at `u64::MAX`
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn unit_legend() -> String {
    WeatherVariable::ALL
        .into_iter()
        .map(|v| format!("- {}: {}", v.key(), v.unit()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the summary prompt for a reference timestamp
pub fn build_prompt(stats: &StatsBundle, reference_iso: &str) -> String {
    format!(
        "Gere um resumo breve (2 a 3 frases) com linguagem leve e humana, \
descrevendo as condições climáticas gerais com base nas médias e probabilidades abaixo.

Considere também a data e o horário: {reference_iso}.
O texto deve soar como uma previsão cotidiana (ex: \"nesta manhã\", \"à tarde\", \"à noite\"), \
sem mencionar coordenadas geográficas nem termos técnicos.

Unidades das variáveis:
{legend}

Dados:
{data}

Instruções:
- Fale de forma natural e positiva, como um boletim informal.
- Resuma temperatura, chuva, vento e umidade de modo compreensível.
- Se a chance de chuva for baixa, diga que o tempo está bom para atividades ao ar livre.
- Se for alta, comente sobre possibilidade de chuva e clima úmido.
- Adapte o tom ao horário do dia (ex: manhã, tarde, noite).
- Use tom acolhedor, fluido e humano.",
        legend = unit_legend(),
        data = stats_payload(stats),
    )
}

/// Generates the natural-language summary
pub struct SummaryService {
    inference: Arc<dyn InferencePort>,
}

impl fmt::Debug for SummaryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryService").finish_non_exhaustive()
    }
}

impl SummaryService {
    /// Create a new summary service
    pub fn new(inference: Arc<dyn InferencePort>) -> Self {
        Self { inference }
    }

    /// Summarize `stats` for the given reference timestamp
    #[instrument(skip(self, stats))]
    pub async fn summarize(
        &self,
        stats: &StatsBundle,
        reference_iso: &str,
    ) -> Result<String, ApplicationError> {
        let start = Instant::now();
        let prompt = build_prompt(stats, reference_iso);

        let result = self
            .inference
            .generate(&prompt)
            .await
            .map_err(|e| ApplicationError::Generation(e.to_string()))?;

        let summary = result.content.trim();
        if summary.is_empty() {
            return Err(ApplicationError::Generation(
                "model returned an empty summary".to_string(),
            ));
        }

        debug!(
            model = %result.model,
            tokens = ?result.tokens_used,
            latency_ms = elapsed_ms(start),
            "Summary generated"
        );

        Ok(summary.to_string())
    }

    /// Check if the underlying inference is healthy
    pub async fn is_healthy(&self) -> bool {
        self.inference.is_healthy().await
    }

    /// Get the current model name
    pub fn current_model(&self) -> String {
        self.inference.current_model()
    }
}
