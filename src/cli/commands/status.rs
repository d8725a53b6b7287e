use crate::config::Config;
use crate::domain::SolvedStatus;
use crate::state::SharedState;

pub async fn cmd_status(config: Config, topic_id: i32) -> anyhow::Result<()> {
    let quote_length = config.solved.solved_quote_length;
    let state = SharedState::new(config).await?;

    let Some(topic) = state.store.get_topic_with_deleted(topic_id).await? else {
        println!("Topic {topic_id} not found.");
        return Ok(());
    };

    println!("Topic {}: {}", topic.id, topic.title);
    println!("{:-<60}", "");

    match state.acceptance.status(topic_id).await? {
        SolvedStatus::Unsolved => println!("Status:   unsolved"),
        SolvedStatus::Solved { answer_post_id } => {
            println!("Status:   solved (post {answer_post_id})");
            if let Some(info) = state.reports.accepted_answer(topic_id, quote_length).await? {
                println!("Answer:   #{} by {}", info.post_number, info.username);
                if let Some(accepter) = info.accepter_username {
                    println!("Accepted: by {accepter}");
                }
                if let Some(excerpt) = info.excerpt {
                    println!("\n  {excerpt}");
                }
            }
        }
    }

    if let Some(timer) = state.store.timer_for_topic(topic_id).await? {
        println!("Closes:   {} ({})", timer.execute_at, timer.status_type);
    }
    if topic.closed {
        println!("Topic is closed.");
    }

    Ok(())
}
