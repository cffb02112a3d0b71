//! Prompt templates for the chat-completion provider.
//!
//! The wording is tuned for 5-6 year old learners: short, everyday
//! vocabulary, explicit output format instructions so the replies can be
//! parsed mechanically.

use super::StoryParams;

/// Prompt asking for 10 common words that each contain `character`.
pub fn words(character: &str) -> String {
    format!(
        r#"请为汉字"{character}"生成10个包含这个字的常用词语。要求：
1. 【重要】每个词语必须包含"{character}"这个字
2. 词语要简单易懂，适合5-6岁学前班儿童学习
3. 每个词语2-4个字
4. 词语要日常生活中常见的
5. 只返回词语，每行一个，不要添加序号、拼音或其他说明

示例格式（如果是"水"字）：
水果
喝水
河水"#
    )
}

/// Prompt asking for 10 short sentences that each contain `text`.
pub fn sentences(text: &str) -> String {
    format!(
        r#"请用"{text}"造10个句子，要求：
1. 【重要】每个句子必须包含"{text}"
2. 句子要简单易懂，适合学前班儿童（5-6岁）理解
3. 句子长度控制在8-15个字
4. 句子内容要贴近儿童日常生活
5. 句子要有教育意义或积极向上的内容
6. 只返回句子，每行一个，不要添加序号或其他说明

示例格式（如果是"水"字）：
我喜欢喝水
水果很好吃
小河里有水"#
    )
}

/// Prompt asking for a 1-2 sentence child-appropriate explanation of a character.
pub fn character_explanation(character: &str) -> String {
    format!(
        r#"请用学龄前儿童（5-6岁）能听懂的简单语言，解释汉字"{character}"的意思。要求：
1. 用1-2句话解释，每句话不超过20个字
2. 语言要生动、形象，贴近儿童生活
3. 可以举一个简单的例子帮助理解
4. 不要使用专业术语或复杂的词汇
5. 直接返回解释内容，不要添加"这个字的意思是"等引导语

示例（如果是"水"字）：
水是我们每天都要喝的液体，可以解渴。小河里、水杯里都有水。"#
    )
}

/// Prompt asking for a JSON object with `explanation` and `examples`.
pub fn word_explanation(word: &str) -> String {
    format!(
        r#"请为词语"{word}"提供适合学前班儿童理解的解释和例句：
1. 用简单的语言解释这个词语的意思
2. 提供2-3个使用这个词语的简单例句
3. 返回格式为JSON：{{"explanation": "解释内容", "examples": ["例句1", "例句2"]}}"#
    )
}

/// Prompt asking for a ~300 character educational story as a JSON object
/// with `title` and `story`.
pub fn story(params: &StoryParams) -> String {
    let name = &params.name;
    let purpose = &params.purpose;
    let scene = &params.scene;
    let gender_text = params.gender.descriptor();
    let pronoun = params.gender.pronoun();

    format!(
        r#"请为学龄前儿童（3-6岁）创作一个教育故事，要求如下：

**故事参数：**
- 主人公：{name}（一个5岁的{gender_text}）
- 教育目的：{purpose}
- 故事场景：{scene}

**创作要求：**
1. 故事长度约300字，适合3-5分钟讲完
2. 语言简单易懂，每句话不超过15个字
3. 要有清晰的开始、发展、结尾结构
4. 包含生动的对话，让故事更有趣
5. 教育目的要自然融入故事，不要说教
6. 结局必须积极向上，给孩子正面鼓励
7. 可以使用重复句式帮助记忆
8. 避免任何恐怖、暴力内容
9. 人物性别用"{pronoun}"来称呼

**返回格式（纯JSON，不要markdown标记）：**
{{
  "title": "故事标题（6-10字）",
  "story": "故事正文内容"
}}

示例标题风格：《{name}学会了分享》、《勇敢的{name}》等"#
    )
}
