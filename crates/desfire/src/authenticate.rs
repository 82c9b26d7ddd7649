//! DES mutual authentication
//!
//! The handshake proves that host and card hold the same key by having each
//! side transform the other's random challenge:
//!
//! 1. the host names a key slot; the card answers `91 AF` with `ek(RndB)`
//! 2. the host recovers `RndB` (zero IV) and draws its own `RndA`
//! 3. the host sends `ek(RndA || rotl(RndB))`, chained on `ek(RndB)`
//! 4. the card answers `ek(rotl(RndA))`, chained on the last token block
//! 5. the host checks the rotated challenge; a mismatch fails the handshake
//!    even when the card reported success

use bytes::Bytes;
use desfire_apdu_core::{Command, Executor, Status};
use rand::RngCore;
use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use crate::constants::{BLOCK_LEN, ins};
use crate::crypto::{Block, ZERO_IV, cbc_encrypt, decrypt_block, rotate_left};
use crate::error::AuthFailure;
use crate::keys::KeyReference;
use crate::{Error, Result};

/// Which authenticate instruction to send
///
/// Both run the same handshake; cards accept one or the other depending on
/// how the key was provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthMode {
    /// AUTHENTICATE (0x0A)
    #[default]
    Legacy,
    /// AUTHENTICATE ISO (0x1A)
    Iso,
}

impl AuthMode {
    /// Instruction byte of this mode
    pub const fn instruction(self) -> u8 {
        match self {
            Self::Legacy => ins::AUTHENTICATE_LEGACY,
            Self::Iso => ins::AUTHENTICATE_ISO,
        }
    }
}

/// Progress of one handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthState {
    /// Nothing sent yet
    Idle,
    /// Authenticate request sent
    ChallengeRequested,
    /// Encrypted card challenge received
    ChallengeReceived,
    /// Host token sent
    ResponseSent,
    /// Card proved possession of the key
    Verified,
    /// Handshake abandoned
    Failed,
}

impl AuthState {
    /// Check if the handshake has finished, successfully or not
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }
}

/// Host token and the challenge the card must echo back
struct Token {
    ciphertext: [u8; 2 * BLOCK_LEN],
    expected: Zeroizing<Block>,
}

impl Token {
    /// IV for decrypting the card's final reply
    fn reply_iv(&self) -> Block {
        let mut iv = [0u8; BLOCK_LEN];
        iv.copy_from_slice(&self.ciphertext[BLOCK_LEN..]);
        iv
    }
}

/// Answer the card's encrypted challenge
fn answer_challenge(key: &KeyReference, ek_rnd_b: &Block, rnd_a: &Block) -> Token {
    let rnd_b = Zeroizing::new(decrypt_block(key.key(), &ZERO_IV, ek_rnd_b));
    let rnd_b_rot = Zeroizing::new(rotate_left(&rnd_b, 1));

    let mut plain = Zeroizing::new([0u8; 2 * BLOCK_LEN]);
    plain[..BLOCK_LEN].copy_from_slice(rnd_a);
    plain[BLOCK_LEN..].copy_from_slice(&*rnd_b_rot);

    let mut ciphertext = [0u8; 2 * BLOCK_LEN];
    ciphertext.copy_from_slice(&cbc_encrypt(key.key(), ek_rnd_b, &*plain));

    Token {
        ciphertext,
        expected: Zeroizing::new(rotate_left(rnd_a, 1)),
    }
}

/// One mutual authentication attempt
///
/// Drives the handshake over an [`Executor`] and records which state it
/// reached. An attempt is single use; retries need a new instance.
#[derive(Debug)]
pub struct MutualAuthentication<'a> {
    key: &'a KeyReference,
    mode: AuthMode,
    state: AuthState,
}

impl<'a> MutualAuthentication<'a> {
    /// Prepare a handshake against `key`
    pub const fn new(key: &'a KeyReference, mode: AuthMode) -> Self {
        Self {
            key,
            mode,
            state: AuthState::Idle,
        }
    }

    /// Current state
    pub const fn state(&self) -> AuthState {
        self.state
    }

    /// Run the handshake to completion
    ///
    /// On any error the state is [`AuthState::Failed`].
    #[instrument(level = "debug", skip_all, fields(key_no = self.key.key_no(), mode = ?self.mode))]
    pub fn run<E, R>(&mut self, executor: &mut E, rng: &mut R) -> Result<()>
    where
        E: Executor,
        R: RngCore + ?Sized,
    {
        if self.state != AuthState::Idle {
            return Err(Error::InvalidArgument("authentication attempt already used"));
        }

        let result = self.exchange(executor, rng);
        self.state = match &result {
            Ok(()) => AuthState::Verified,
            Err(e) => {
                warn!(state = ?self.state, error = %e, "Authentication failed");
                AuthState::Failed
            }
        };
        result
    }

    fn exchange<E, R>(&mut self, executor: &mut E, rng: &mut R) -> Result<()>
    where
        E: Executor,
        R: RngCore + ?Sized,
    {
        let request = Command::with_data(self.mode.instruction(), [self.key.key_no()].to_vec());
        self.state = AuthState::ChallengeRequested;
        let challenge = executor.transmit(&request)?;

        if challenge.outcome() != Status::Continuation {
            return Err(AuthFailure::RequestRejected(challenge.status()).into());
        }
        let ek_rnd_b = Block::try_from(&challenge.payload()[..])
            .map_err(|_| AuthFailure::MalformedChallenge(challenge.payload().len()))?;
        self.state = AuthState::ChallengeReceived;
        debug!("Card challenge received");

        let mut rnd_a = Zeroizing::new([0u8; BLOCK_LEN]);
        rng.fill_bytes(&mut *rnd_a);
        let token = answer_challenge(self.key, &ek_rnd_b, &rnd_a);

        let answer = Command::with_data(
            ins::ADDITIONAL_FRAME,
            Bytes::copy_from_slice(&token.ciphertext),
        );
        self.state = AuthState::ResponseSent;
        let reply = executor.transmit(&answer)?;

        if !reply.is_success() {
            return Err(AuthFailure::ResponseRejected(reply.status()).into());
        }
        let ek_rnd_a_rot = Block::try_from(&reply.payload()[..])
            .map_err(|_| AuthFailure::MalformedReply(reply.payload().len()))?;

        let rnd_a_rot = Zeroizing::new(decrypt_block(
            self.key.key(),
            &token.reply_iv(),
            &ek_rnd_a_rot,
        ));
        if *rnd_a_rot != *token.expected {
            return Err(AuthFailure::ChallengeMismatch.into());
        }

        debug!("Card proved possession of the key");
        Ok(())
    }
}
