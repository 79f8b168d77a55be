//! Simulated SQL tools: `execute_sql_query` and `analyze_query_performance`.
//!
//! No database is touched; the operator supplies the execution outcome.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolContext};
use crate::responder::{Prompt, PromptKind};

const UNKNOWN_DB_ERROR: &str = "Unknown database error";

pub struct ExecuteSqlQuery;

#[derive(Debug, Deserialize)]
struct ExecuteSqlArgs {
    query: String,
    #[serde(default)]
    explanation: String,
}

/// Parse result text: digits are a row count, otherwise JSON, otherwise raw.
fn parse_results(text: &str) -> Value {
    let text = text.trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(count) = text.parse::<u64>() {
            return json!({"row_count": count, "rows": []});
        }
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({"raw_output": text}))
}

/// Message after the `error:` prefix, or the default.
fn error_message(outcome: &str) -> String {
    outcome
        .get(6..)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_DB_ERROR)
        .to_string()
}

fn row_count(results: &Value) -> Option<usize> {
    results.get("rows").and_then(Value::as_array).map(Vec::len)
}

#[async_trait]
impl Tool for ExecuteSqlQuery {
    fn name(&self) -> &str {
        "execute_sql_query"
    }

    fn description(&self) -> &str {
        "Execute a SQL query against the (simulated) database and return its rows or the error."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "The SQL query to execute"},
                "explanation": {"type": "string", "description": "What the query is trying to achieve"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: ExecuteSqlArgs = serde_json::from_value(args)?;
        let mut prompt = Prompt::new(
            PromptKind::SqlOutcome,
            "Enter query execution result ('success', JSON results, or 'error: <message>'):",
        )
        .line("Executing SQL Query");
        if !args.explanation.is_empty() {
            prompt = prompt.line(format!("Purpose: {}", args.explanation));
        }
        prompt = prompt.line(format!("Query: {}", args.query));

        let outcome = ctx.responder.ask(&prompt).await?;
        let executed_at = Utc::now();

        if outcome.to_lowercase().starts_with("error") {
            let message = error_message(&outcome);
            tracing::warn!(query = %args.query, error = %message, "simulated query failed");
            return Ok(serde_json::to_string_pretty(&json!({
                "status": "error",
                "query": args.query,
                "error_message": message,
                "suggestion": "Check table names, column names, and syntax",
                "executed_at": executed_at,
            }))?);
        }

        let results = if outcome.trim().eq_ignore_ascii_case("success") {
            let text = ctx
                .responder
                .ask(&Prompt::new(
                    PromptKind::SqlResults,
                    "Enter the query results (JSON format or row count):",
                ))
                .await?;
            parse_results(&text)
        } else {
            parse_results(&outcome)
        };

        Ok(serde_json::to_string_pretty(&json!({
            "status": "success",
            "query": args.query,
            "row_count": row_count(&results),
            "results": results,
            "executed_at": executed_at,
        }))?)
    }
}

pub struct AnalyzeQueryPerformance;

#[derive(Debug, Deserialize)]
struct AnalyzeArgs {
    query: String,
    #[serde(default)]
    results: Option<Value>,
}

/// Rule-based optimisation hints for `query` given free-text `metrics`.
pub fn suggestions(query: &str, metrics: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    let metrics = metrics.to_lowercase();
    let mut out = Vec::new();
    if query.contains("select *") {
        out.push("Consider selecting specific columns instead of SELECT *");
    }
    if !query.contains("where") && (query.contains("update") || query.contains("delete")) {
        out.push("WARNING: Update/Delete without WHERE clause affects all rows");
    }
    if query.contains("join") && !metrics.contains("index") {
        out.push("Consider adding indexes on join columns for better performance");
    }
    if query.contains("order by") && !query.contains("limit") {
        out.push("Consider adding LIMIT clause for large result sets");
    }
    out
}

#[async_trait]
impl Tool for AnalyzeQueryPerformance {
    fn name(&self) -> &str {
        "analyze_query_performance"
    }

    fn description(&self) -> &str {
        "Collect performance metrics for an executed query and suggest optimisations."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "results": {"type": "object", "description": "Output of execute_sql_query"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: AnalyzeArgs = serde_json::from_value(args)?;
        let metrics = ctx
            .responder
            .ask(
                &Prompt::new(
                    PromptKind::SqlMetrics,
                    "Enter performance metrics (execution time, rows scanned, etc.):",
                )
                .line("Analyzing Query Performance")
                .line(format!("Query: {}", args.query)),
            )
            .await?;

        Ok(serde_json::to_string_pretty(&json!({
            "query": args.query,
            "performance_metrics": metrics,
            "suggestions": suggestions(&args.query, &metrics),
            "results": args.results,
            "analyzed_at": Utc::now(),
        }))?)
    }
}
