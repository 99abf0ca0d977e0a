//! The decryption-session state machine.
//!
//! `Dealt` and the transition to `Ready` are represented at the type level
//! by [`super::ThresholdPrivateKey::deal`] consuming the private key: once
//! dealt, a [`DecryptionSession`] is the only way to collect and combine
//! shares, and it can only ever be constructed post-dealing.

use std::collections::BTreeMap;

use rug::Integer;

use crate::error::{Error, Result};

use super::combine::share_combine;
use super::ThresholdPublicKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No shares collected yet.
    Ready,
    /// `1 <= shares collected < w`.
    Collecting,
    /// `shares collected >= w`; `combine` may be called.
    Combinable,
    /// `combine` succeeded; terminal.
    Done,
    /// A `ShareCombineFailed` occurred; terminal.
    Failed,
}

/// Collects partial decryptions for a single ciphertext and combines them
/// once a quorum is present.
pub struct DecryptionSession<'pk> {
    pk: &'pk ThresholdPublicKey,
    ciphertext: Integer,
    shares: BTreeMap<usize, Integer>,
    state: SessionState,
}

impl<'pk> DecryptionSession<'pk> {
    pub fn new(pk: &'pk ThresholdPublicKey, ciphertext: Integer) -> Self {
        Self {
            pk,
            ciphertext,
            shares: BTreeMap::new(),
            state: SessionState::Ready,
        }
    }

    pub fn ciphertext(&self) -> &Integer {
        &self.ciphertext
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record a partial decryption from authority `external_index`.
    /// Idempotent: resubmitting the same index overwrites its entry rather
    /// than double-counting it toward quorum.
    pub fn submit_share(&mut self, external_index: usize, partial_decryption: Integer) -> Result<()> {
        if matches!(self.state, SessionState::Done | SessionState::Failed) {
            return Err(Error::InvariantViolation);
        }
        self.shares.insert(external_index, partial_decryption);
        self.state = if self.shares.len() >= self.pk.w {
            SessionState::Combinable
        } else {
            SessionState::Collecting
        };
        Ok(())
    }

    pub fn shares_collected(&self) -> usize {
        self.shares.len()
    }

    /// Combine the collected shares. Fails with `QuorumNotMet` if fewer than
    /// `w` shares have been submitted; any combine failure moves the session
    /// to the terminal `Failed` state.
    pub fn combine(&mut self) -> Result<Integer> {
        let pairs: Vec<(usize, Integer)> = self
            .shares
            .iter()
            .map(|(i, c)| (*i, c.clone()))
            .collect();

        match share_combine(self.pk, &pairs) {
            Ok(m) => {
                self.state = SessionState::Done;
                Ok(m)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand_source::RandomSource;
    use crate::threshold::{encrypt, generate_key_pair};

    #[test]
    fn session_transitions_through_states() {
        let mut r = RandomSource::new_with_seed(0);
        let (pk, vk) = generate_key_pair(&mut r, 16, 3, 5).unwrap();
        let servers = vk.deal(&mut r, &pk).0;

        let (c, _u) = encrypt(&pk, &mut r, &Integer::from(10));
        let mut session = DecryptionSession::new(&pk, c.clone());
        assert_eq!(session.state(), SessionState::Ready);

        for (count, server) in servers.iter().enumerate() {
            let share = crate::capability::Threshold::share_decrypt(server, &pk, &c);
            session.submit_share(server.external_index(), share).unwrap();
            if count + 1 < 3 {
                assert_eq!(session.state(), SessionState::Collecting);
            } else {
                assert_eq!(session.state(), SessionState::Combinable);
            }
        }

        let m = session.combine().unwrap();
        assert_eq!(m, Integer::from(10));
        assert_eq!(session.state(), SessionState::Done);
    }

    #[test]
    fn combine_below_quorum_fails() {
        let mut r = RandomSource::new_with_seed(1);
        let (pk, vk) = generate_key_pair(&mut r, 16, 3, 5).unwrap();
        let servers = vk.deal(&mut r, &pk).0;

        let (c, _u) = encrypt(&pk, &mut r, &Integer::from(10));
        let mut session = DecryptionSession::new(&pk, c.clone());
        for server in servers.iter().take(2) {
            let share = crate::capability::Threshold::share_decrypt(server, &pk, &c);
            session.submit_share(server.external_index(), share).unwrap();
        }

        assert_eq!(
            session.combine().unwrap_err(),
            Error::QuorumNotMet
        );
        assert_eq!(session.state(), SessionState::Failed);
    }
}
