use crate::foundation::rng::Rng64;

/// Generator of opaque layer ids.
///
/// Ids are `<session prefix><counter>` in base 36. The counter only moves forward, so an id is
/// never handed out twice by the same generator, including ids of layers deleted since.
#[derive(Clone, Debug)]
pub struct IdGen {
    prefix: String,
    counter: u64,
}

impl IdGen {
    /// Deterministic generator; equal seeds produce equal id sequences.
    pub fn new(seed: u64) -> Self {
        let mut rng = Rng64::new(seed);
        let mut prefix = to_base36(rng.next_u64());
        prefix.truncate(8);
        Self { prefix, counter: 0 }
    }

    /// Generator seeded from the wall clock.
    pub fn from_entropy() -> Self {
        Self::new(Rng64::from_entropy().next_u64())
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.prefix, to_base36(self.counter))
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter
    }
}

impl Default for IdGen {
    fn default() -> Self {
        Self::from_entropy()
    }
}

fn to_base36(mut v: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if v == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::with_capacity(13);
    while v > 0 {
        out.push(DIGITS[(v % 36) as usize]);
        v /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
