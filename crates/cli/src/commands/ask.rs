//! `roster ask` — Answer one question.

pub async fn run(query: String, thread: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let session = super::open_session(&config).await?;
    let thread_id = super::resolve_thread(thread);

    let outcome = session.invoke(&query, &thread_id).await?;
    tracing::debug!(thread_id = %thread_id, steps = outcome.steps, "Answered");
    println!("{}", outcome.answer);
    Ok(())
}
