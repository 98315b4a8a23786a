use super::{Feedback, LlmClient, LlmError};

const TEMPERATURE: f32 = 0.0;
const MAX_EXAMPLES: usize = 2;

pub async fn judge(
    client: &LlmClient,
    model: &str,
    user_input: &str,
    conversation: &str,
    phrase: &str,
) -> Result<Feedback, LlmError> {
    let prompt = format!(
        r#"あなたは優秀な英語講師です。
日本人生徒の作成した英語文章を添削するのが得意です。

以下の前提条件をよく確認し、タスクを実施してください。

### 前提条件
「### ユーザー入力」は、「### 会話文」の「<?>」に当てはまる文章として、ユーザーが考えたものです。
「### 英語フレーズ」は、「### 会話文」の「<?>」に当てはめるのに最適な文章の例です。

### タスク
「### ユーザー入力」の英語文章を添削してください。
会話文に当てはまる自然な英語文章かどうかという観点で確認してください。
添削と同時に、この会話文から読み取れるニュアンスも一緒に説明してください。
いくつか、最大２つの回答例も提示してください。

添削した内容は、ユーザーにわかりやすいように簡潔に説明してください。
説明は、必ず日本語で行ってください。


### ユーザー入力
{user_input}

### 会話文
{conversation}

### 英語フレーズ
{phrase}

### 出力形式
以下の構造のJSONオブジェクトのみを返してください。JSON以外のテキストは一切含めないでください。
{{
    "conversation": "入力された会話文",
    "phrase": "入力された英語フレーズ",
    "correction_result": "添削した内容やニュアンスの説明",
    "examples": ["回答例（最大２つ）"]
}}"#
    );

    let text = client.complete(model, TEMPERATURE, &prompt).await?;
    let mut feedback: Feedback = super::parse_structured(&text)?;
    feedback.examples.truncate(MAX_EXAMPLES);
    Ok(feedback)
}
