use askdb::{
    prompts::tasks::default_tasks,
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider, ApiEmbeddingProvider},
        db::{sqlite::SqliteProvider, storage::Storage},
    },
    AskdbExecutor, ExecutorSettings, SchemaIndex,
};
use dotenvy::dotenv;
use std::{collections::HashMap, env, sync::Arc};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging and load .env file
    tracing_subscriber::fmt::init();
    dotenv().ok();

    // --- Command-line argument parsing ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} '<question>'", args[0]);
        eprintln!();
        eprintln!("Example: {} 'How many employees are there?'", args[0]);
        return Ok(());
    }
    let question = &args[1];

    // --- Configuration from environment variables ---
    let ai_provider_name = env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
    let api_url = env::var("AI_API_URL")?;
    let api_key = env::var("AI_API_KEY").ok();
    let ai_model = env::var("AI_MODEL").ok();
    let database_url = env::var("DATABASE_URL")?;
    let embeddings_url = env::var("EMBEDDINGS_API_URL")?;
    let embeddings_model = env::var("EMBEDDINGS_MODEL")?;

    // --- Build AI Provider ---
    let ai_provider: Box<dyn AiProvider> = match ai_provider_name.as_str() {
        "gemini" => {
            let key = api_key.clone().ok_or("AI_API_KEY is required for gemini provider")?;
            Box::new(GeminiProvider::new(api_url, key)?)
        }
        "local" => Box::new(LocalAiProvider::new(api_url, api_key.clone(), ai_model)?),
        _ => return Err(format!("Unsupported AI provider: {ai_provider_name}").into()),
    };
    let mut providers = HashMap::new();
    providers.insert(ai_provider_name.clone(), ai_provider);

    // --- Build storage, schema index and executor ---
    let storage: Arc<dyn Storage> = Arc::new(SqliteProvider::from_url(&database_url).await?);
    let embedder = Arc::new(ApiEmbeddingProvider::new(
        embeddings_url,
        embeddings_model,
        api_key,
    )?);
    let schema_index = SchemaIndex::build(storage.as_ref(), embedder).await?;
    let executor = AskdbExecutor::from_tasks(
        &providers,
        &default_tasks(&ai_provider_name),
        storage,
        Arc::new(schema_index),
        ExecutorSettings::default(),
    )?;

    // --- Ask ---
    match executor.route(question).await {
        Ok(outcome) => {
            println!("--- Response ---");
            println!("{}", outcome.response);

            if let Some(sql) = outcome.sql_query {
                println!("\n--- SQL Query ---");
                println!("{sql}");
            }
        }
        Err(e) => eprintln!("Error: {e}"),
    }

    Ok(())
}
