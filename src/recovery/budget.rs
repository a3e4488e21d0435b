/// Credential-triggered retries left for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
    spent: u32,
}

impl RetryBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            remaining: limit,
            spent: 0,
        }
    }

    /// Take one retry. Returns false once the budget is exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.spent += 1;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn spent(&self) -> u32 {
        self.spent
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_RETRY_BUDGET)
    }
}
