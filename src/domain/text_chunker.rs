//! 文本分块器
//!
//! 将任意长度的文本切分为不超过字符预算的块，尽量保留边界。
//! 边界优先级：句子 > 分句（逗号） > 单词

/// 检查是否为句末标点
#[inline]
fn is_sentence_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '。' | '！' | '？')
}

/// 字符数（按 Unicode 标量计）
#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 在“分隔符 + 空白”处切分
///
/// 分隔符保留在前一个片段末尾，空白被丢弃
fn split_after(text: &str, is_delimiter: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if ch.is_whitespace() && prev.is_some_and(&is_delimiter) {
            pieces.push(&text[start..idx]);
            // 跳过整段空白
            let mut next_start = text.len();
            while let Some(&(j, c)) = iter.peek() {
                if c.is_whitespace() {
                    iter.next();
                } else {
                    next_start = j;
                    break;
                }
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// 按句末标点切句
fn split_sentences(text: &str) -> Vec<&str> {
    split_after(text, is_sentence_terminal)
}

/// 按逗号切分句
fn split_clauses(sentence: &str) -> Vec<&str> {
    split_after(sentence, |c| matches!(c, ',' | '，'))
}

/// 贪心累加器
struct ChunkBuilder {
    max_chars: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl ChunkBuilder {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    /// `current + " " + piece` 是否仍在预算内
    fn fits(&self, piece_len: usize) -> bool {
        if self.current.is_empty() {
            piece_len <= self.max_chars
        } else {
            self.current_len + 1 + piece_len <= self.max_chars
        }
    }

    /// 追加片段；放不下时先 flush 再以该片段开新块
    fn push(&mut self, piece: &str) {
        let piece = piece.trim();
        if piece.is_empty() {
            return;
        }
        let piece_len = char_len(piece);
        if self.fits(piece_len) {
            if !self.current.is_empty() {
                self.current.push(' ');
                self.current_len += 1;
            }
            self.current.push_str(piece);
            self.current_len += piece_len;
        } else {
            self.flush();
            self.current.push_str(piece);
            self.current_len = piece_len;
        }
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let chunk = std::mem::take(&mut self.current);
        self.current_len = 0;
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
    }

    /// 超长分句：按单词累加
    fn push_words(&mut self, clause: &str) {
        self.flush();
        for word in clause.split_whitespace() {
            self.push(word);
        }
        self.flush();
    }

    /// 超长句子：按分句累加，分句仍超长则按单词
    fn push_clauses(&mut self, sentence: &str) {
        self.flush();
        for clause in split_clauses(sentence) {
            if char_len(clause.trim()) > self.max_chars {
                self.push_words(clause);
            } else {
                self.push(clause);
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// 对文本进行分块
///
/// - 空文本（或全空白）返回空列表
/// - 不超过预算的文本原样返回 `[text]`
/// - 否则按句子、分句、单词逐级贪心合并
///
/// 单个超过预算的单词整体输出，不截断。`max_chars` 为 0 时每个单词单独成块。
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut builder = ChunkBuilder::new(max_chars);
    for sentence in split_sentences(text) {
        if char_len(sentence.trim()) > max_chars {
            builder.push_clauses(sentence);
        } else {
            builder.push(sentence);
        }
    }
    builder.finish()
}
