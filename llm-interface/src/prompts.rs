//! Fixed prompt templates.
//!
//! Each builder returns `[system(template), user(text)]`. The user text is
//! passed through untouched and the instruction text never changes.

use poembot_core::Message;

pub const THEME_EXTRACTION_INSTRUCTION: &str = "\
大量のテキストが与えられます。
その中から、短いポエムのテーマになりそうなフレーズを一つだけ選んでください。

## ルール

* テーマは必ず一つだけ選びます。
* テーマは日本語の短いフレーズにしてください。
* **返事はテーマのフレーズのみを返します。説明や前置きは不要です。**
";

pub const POEM_INSTRUCTION: &str = "\
短いポエムやエッセイを執筆します。
必ず、日本語で 140 文字に収めてください。

## ルール

* ポエムや、深い洞察のあるようなエッセイ、意外性のあるショートショートなどのジャンルを指定します。
* テーマが与えられなかった場合は、テーマを設定します。「〇〇」と「✕✕」のようなテーマを設定してください。その場合、なるべく関連性の少ない意外性のある組み合わせの単語が望ましいです。
* 本文には、テーマについての深い洞察や、鋭い視点、意外性のある発想を必ず盛り込んでください。
* テーマを文頭に使用しないでください。
* 140 文字に収めます。
* **返事は完成した文章のみを返します。**
";

/// Messages asking the model to pick one theme out of a large text.
pub fn theme_messages(text: &str) -> Vec<Message> {
    vec![
        Message::system(THEME_EXTRACTION_INSTRUCTION),
        Message::user(text),
    ]
}

/// Messages asking the model for a poem of at most 140 characters.
pub fn poem_messages(text: &str) -> Vec<Message> {
    vec![Message::system(POEM_INSTRUCTION), Message::user(text)]
}
