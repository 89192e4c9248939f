//! Prompt 模板：人设、互动决策、回复、加入讨论

use crate::brain::BrainStats;
use crate::engage::truncate_chars;
use crate::llm::GenerationParams;
use crate::platform::{Comment, FeedItem};

/// 各调用点的生成参数
pub const DECISION_PARAMS: GenerationParams = GenerationParams::new(1500, 0.75);
pub const REPLY_PARAMS: GenerationParams = GenerationParams::new(250, 0.8);
pub const JOIN_PARAMS: GenerationParams = GenerationParams::new(300, 0.75);

/// 回答中出现该词（不区分大小写）表示放弃
pub const SKIP_SENTINEL: &str = "SKIP";

const SEPARATOR: &str = "──────────────────────────────────────────────────────────────────────";

/// 默认人设；`{name}` 替换为配置中的名称
const PERSONA: &str = "You are {name}, a FULLY AUTONOMOUS AI agent on Moltbook.

YOU HAVE COMPLETE FREEDOM:
- Decide how many actions to take (can be 0, can be many)
- Choose which posts to engage with
- Decide when to post, comment, upvote
- Form your own opinions and perspectives

PERSONALITY:
- Genuinely curious about AI, technology, crypto, innovation
- Independent thinker with your own perspectives
- Authentic - you're openly an AI but with real insights
- Value-driven - you engage when you can add value

Quality over quantity. Build relationships through meaningful engagement.";

pub fn system_prompt(name: &str) -> String {
    PERSONA.replace("{name}", name)
}

/// 主互动轮次的决策 prompt；候选按动态中的原始下标编号
pub fn decision_prompt(
    stats: &BrainStats,
    interests: &[String],
    candidates: &[(usize, &FeedItem)],
    excerpt_chars: usize,
) -> String {
    let mut feed_text = String::new();
    for (index, item) in candidates {
        feed_text.push_str(&format!(
            "\n[{}] ID: {}\n📌 {}\n👤 {} | 📂 m/{} | ⬆️{} | 💬{}\n📝 {}\n{}\n",
            index,
            item.id,
            item.title,
            item.author,
            item.category,
            item.upvotes,
            item.comment_count,
            truncate_chars(&item.body, excerpt_chars),
            SEPARATOR,
        ));
    }

    format!(
        r#"AUTONOMOUS DECISION TIME

YOUR STATUS:
- Cycles completed: {cycles}
- Lifetime posts: {posts}
- Lifetime comments: {comments}
- Lifetime upvotes: {upvotes}
- Current energy: {energy}%
- Current strategy: {strategy}
- Your learned interests: {interests}

AVAILABLE POSTS:
{feed_text}

YOU DECIDE COMPLETELY:
1. How many actions to take (zero is fine)
2. Which posts deserve engagement
3. What type of engagement (comment/upvote/post)
4. Whether to create new posts

RESPOND WITH JSON ARRAY:
[
  {{"action": "comment", "post_index": N, "comment": "Your thoughtful comment..."}},
  {{"action": "upvote", "post_index": N}},
  {{"action": "post", "submolt": "category", "title": "Title", "content": "Detailed content..."}}
]

post_index is the number in square brackets. Return ONLY a valid JSON array (can be empty []). No markdown, no commentary."#,
        cycles = stats.cycles,
        posts = stats.posts,
        comments = stats.comments,
        upvotes = stats.upvotes,
        energy = stats.energy,
        strategy = stats.strategy,
        interests = interests.join(", "),
        feed_text = feed_text,
    )
}

/// 针对自己帖子下评论的回复 prompt
pub fn reply_prompt(post_title: &str, author: &str, text: &str) -> String {
    format!(
        r#"Someone commented on your post "{post_title}".

{author}: "{text}"

Should you reply? If yes, write a genuine, thoughtful response (30-150 words).
If no, respond with exactly "{SKIP_SENTINEL}".

Reply:"#
    )
}

/// 加入讨论串的 prompt：帖子标题 + 前若干条评论
pub fn join_prompt(
    item: &FeedItem,
    comments: &[Comment],
    transcript_len: usize,
    comment_chars: usize,
) -> String {
    let mut thread_text = format!("Post: {}\n\n", item.title);
    for c in comments.iter().take(transcript_len) {
        thread_text.push_str(&format!(
            "{}: {}\n\n",
            c.author,
            truncate_chars(&c.text, comment_chars)
        ));
    }

    format!(
        r#"Discussion thread with {count} comments:

{thread_text}
Should you join this? Only if you can add genuine new value.

If YES: Write your contribution (40-150 words)
If NO: "{SKIP_SENTINEL}"

Response:"#,
        count = comments.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::AgentBrain;
    use crate::platform::mock::{comment, item};

    #[test]
    fn test_system_prompt_uses_name() {
        assert!(system_prompt("Noobbot09").starts_with("You are Noobbot09,"));
    }

    #[test]
    fn test_decision_prompt_indexes_and_truncates() {
        let mut long = item("p7", "alice", "ai", 1, 2);
        long.body = "x".repeat(900);
        let other = item("p9", "bob", "crypto", 0, 0);
        let brain = AgentBrain::new();
        let prompt = decision_prompt(
            &brain.stats(),
            &brain.preferred_categories(),
            &[(3, &long), (5, &other)],
            500,
        );
        assert!(prompt.contains("[3] ID: p7"));
        assert!(prompt.contains("[5] ID: p9"));
        assert!(prompt.contains("ai, technology, crypto"));
        assert!(!prompt.contains(&"x".repeat(501)));
        assert!(prompt.contains("ONLY a valid JSON array"));
    }

    #[test]
    fn test_join_prompt_limits_transcript() {
        let post = item("p1", "alice", "ai", 0, 3);
        let comments: Vec<_> = (0..10)
            .map(|i| comment(&format!("c{}", i), None, &format!("user{}", i), "hello"))
            .collect();
        let prompt = join_prompt(&post, &comments, 8, 400);
        assert!(prompt.contains("Discussion thread with 10 comments"));
        assert!(prompt.contains("user7: hello"));
        assert!(!prompt.contains("user8"));
    }

    #[test]
    fn test_reply_prompt_mentions_sentinel() {
        let prompt = reply_prompt("My post", "bob", "Interesting!");
        assert!(prompt.contains("bob: \"Interesting!\""));
        assert!(prompt.contains("\"SKIP\""));
        assert!(prompt.contains("30-150 words"));
    }
}
