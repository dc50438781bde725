use async_trait::async_trait;
use console_client::{Confirm, ConfirmPrompt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// 在终端上询问确认，只有 y/yes 视为同意
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        let mut stderr = tokio::io::stderr();
        let question = format!("{}\n{} [y/N] ", prompt.title, prompt.message);
        if let Err(e) = stderr.write_all(question.as_bytes()).await {
            warn!("无法输出确认提示: {}", e);
            return false;
        }
        let _ = stderr.flush().await;

        let mut answer = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut answer).await {
            Ok(0) => false,
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                warn!("读取确认输入失败: {}", e);
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("  YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }
}
