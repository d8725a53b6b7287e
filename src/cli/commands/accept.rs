use anyhow::{Context, bail};

use crate::config::Config;
use crate::models::post::Post;
use crate::models::topic::Topic;
use crate::models::user::User;
use crate::state::SharedState;

pub async fn cmd_accept(config: Config, post_id: i32, username: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let (user, post, topic) = resolve(&state, post_id, username).await?;

    let solution = state.acceptance.accept(&post, &user, &topic).await?;

    println!(
        "✓ Post #{} accepted as the answer of topic {} ({})",
        post.post_number, topic.id, topic.title
    );
    if let Some(timer_id) = solution.topic_timer_id {
        println!("  Auto-close timer scheduled (id {timer_id})");
    }
    Ok(())
}

pub async fn cmd_unaccept(config: Config, post_id: i32, username: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let (_, post, topic) = resolve(&state, post_id, username).await?;

    state.acceptance.unaccept(&post, &topic).await?;

    println!(
        "✓ Post #{} is no longer the answer of topic {}",
        post.post_number, topic.id
    );
    Ok(())
}

async fn resolve(
    state: &SharedState,
    post_id: i32,
    username: &str,
) -> anyhow::Result<(User, Post, Topic)> {
    let user = state
        .store
        .get_user_by_username(username)
        .await?
        .with_context(|| format!("User '{username}' not found"))?;

    let post = state
        .store
        .posts()
        .get_live(post_id)
        .await?
        .with_context(|| format!("Post {post_id} not found"))?;

    let topic = if user.is_staff() {
        state.store.get_topic_with_deleted(post.topic_id).await?
    } else {
        state.store.get_topic(post.topic_id).await?
    };

    let solved = state.config().await.solved;
    if !state
        .policy
        .can_accept(&solved, Some(&user), topic.as_ref(), Some(&post))
        .await?
    {
        bail!("{username} may not accept answers on this topic");
    }

    let topic = topic.with_context(|| format!("Topic {} not found", post.topic_id))?;
    Ok((user, post, topic))
}
