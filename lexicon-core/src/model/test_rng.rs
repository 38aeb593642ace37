use rand::RngCore;

/// RNG that only yields zero bits: every range draw returns its lower bound,
/// so the sampler always takes the first viable candidate.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FirstCandidate;

impl RngCore for FirstCandidate {
	fn next_u32(&mut self) -> u32 {
		0
	}

	fn next_u64(&mut self) -> u64 {
		0
	}

	fn fill_bytes(&mut self, dst: &mut [u8]) {
		dst.fill(0);
	}
}
