/// A minimal cursor over the textual width tables embedded in this crate.
pub(crate) struct Parser<'a>(pub(crate) &'a str);
impl<'a> Parser<'a> {

    pub fn new(s:&'a str) -> Self {
        Parser(s.trim_start())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, c:char) -> bool {
        self.0.starts_with(c)
    }

    pub fn skip(&mut self, n: usize) {
        self.0 = self.0[n..].trim_start();
    }

    /// Reads an optionally signed decimal number; `None` if there is none.
    pub fn read_number(&mut self) -> Option<i32> {
        let sign = if self.starts_with('-') { 1 } else { 0 };
        if !self.0[sign..].starts_with(|c:char| c.is_ascii_digit()) { return None }
        let end = self.0[sign..].find(|c:char| !c.is_ascii_digit())
            .map(|i| i + sign).unwrap_or(self.0.len());
        let (digits,rest) = self.0.split_at(end);
        self.0 = rest.trim_start();
        digits.parse().ok()
    }

    pub fn read_until_ws(&mut self) -> &'a str {
        match self.0.find(char::is_whitespace) {
            Some(i) => {
                let (ret,rest) = self.0.split_at(i);
                self.0 = rest.trim_start();
                ret
            }
            None => {
                let ret = self.0;
                self.0 = "";
                ret
            }
        }
    }

    pub fn drop(&mut self,s:&str) -> bool {
        if self.0.starts_with(s) {
            self.skip(s.len());
            true
        } else { false }
    }
}
