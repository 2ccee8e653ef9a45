#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confusion {
    pub true_pos: usize,
    pub false_pos: usize,
    pub true_neg: usize,
    pub false_neg: usize,
}

impl Confusion {
    pub fn samples(&self) -> usize {
        self.true_pos + self.false_pos + self.true_neg + self.false_neg
    }
}

pub fn confusion(predicted: &[u8], actual: &[u8]) -> Confusion {
    let mut c = Confusion {
        true_pos: 0,
        false_pos: 0,
        true_neg: 0,
        false_neg: 0,
    };
    for (&p, &a) in predicted.iter().zip(actual) {
        match (p == 1, a == 1) {
            (true, true) => c.true_pos += 1,
            (true, false) => c.false_pos += 1,
            (false, false) => c.true_neg += 1,
            (false, true) => c.false_neg += 1,
        }
    }
    c
}

/// TP / (TP + FP); 0 when nothing was predicted positive.
pub fn precision(predicted: &[u8], actual: &[u8]) -> f64 {
    let c = confusion(predicted, actual);
    let positives = c.true_pos + c.false_pos;
    if positives == 0 {
        return 0.0;
    }
    c.true_pos as f64 / positives as f64
}

pub fn accuracy(predicted: &[u8], actual: &[u8]) -> f64 {
    let c = confusion(predicted, actual);
    let n = c.samples();
    if n == 0 {
        return 0.0;
    }
    (c.true_pos + c.true_neg) as f64 / n as f64
}
