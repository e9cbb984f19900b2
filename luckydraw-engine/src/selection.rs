use luckydraw_core::Participant;
use rand::{Rng, RngCore};

/// Uniform pick over the eligible set; `None` when there is nobody left.
pub fn select_uniform(eligible: &[&Participant], rng: &mut dyn RngCore) -> Option<Participant> {
    if eligible.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..eligible.len());
    Some(eligible[index].clone())
}
