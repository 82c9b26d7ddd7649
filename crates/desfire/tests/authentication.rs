//! Mutual authentication against the simulated card

mod common;

use common::SimulatedCard;
use desfire_ev1::{
    AccessRights, ApplicationId, AuthFailure, AuthMode, AuthState, AuthenticationState, CommMode,
    DesKey, Desfire, Error, ErrorCategory, KeyReference, KeySettings, MutualAuthentication,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const AID: [u8; 3] = [0xF4, 0x8E, 0xF1];

#[test]
fn test_factory_key_on_picc() {
    common::init_tracing();
    let mut card = Desfire::new(SimulatedCard::new());

    card.select_picc().unwrap();
    card.authenticate(&KeyReference::factory_master(), AuthMode::Legacy)
        .unwrap();

    assert_eq!(
        *card.authentication(),
        AuthenticationState::Authenticated {
            application: ApplicationId::PICC,
            key_no: 0,
        }
    );
}

#[test]
fn test_iso_mode_and_custom_key() {
    common::init_tracing();
    let key = DesKey::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);

    let aid = ApplicationId::new(AID);
    let mut sim = SimulatedCard::new();
    sim.add_application(AID, 0x0F, 2);
    sim.set_key(AID, 1, key.clone());

    let mut card = Desfire::new(sim);
    card.select_application(aid).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    card.authenticate_with_rng(&KeyReference::new(1, key).unwrap(), AuthMode::Iso, &mut rng)
        .unwrap();

    assert!(card.authentication().is_authenticated());
    assert!(card.transport().instructions().contains(&0x1A));
}

#[test]
fn test_wrong_key_is_rejected_by_card() {
    let mut card = Desfire::new(SimulatedCard::new());
    let wrong = KeyReference::new(0, DesKey::new([0xA5; 8])).unwrap();

    let err = card.authenticate(&wrong, AuthMode::Legacy).unwrap_err();

    assert!(matches!(
        err,
        Error::AuthenticationFailed(AuthFailure::ResponseRejected(sw)) if sw.to_u16() == 0x91AE
    ));
    assert_eq!(err.category(), ErrorCategory::Authentication);
    assert_eq!(*card.authentication(), AuthenticationState::Unauthenticated);
}

#[test]
fn test_mismatched_reply_fails_despite_success_status() {
    let mut sim = SimulatedCard::new();
    sim.corrupt_auth_reply = true;
    let mut card = Desfire::new(sim);

    let err = card
        .authenticate(&KeyReference::factory_master(), AuthMode::Legacy)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AuthenticationFailed(AuthFailure::ChallengeMismatch)
    ));
    assert!(!card.authentication().is_authenticated());
}

#[test]
fn test_missing_key_slot() {
    let mut card = Desfire::new(SimulatedCard::new());
    let key = KeyReference::new(5, DesKey::default()).unwrap();

    let err = card.authenticate(&key, AuthMode::Legacy).unwrap_err();

    assert!(matches!(
        err,
        Error::AuthenticationFailed(AuthFailure::RequestRejected(sw)) if sw.to_u16() == 0x9140
    ));
}

#[test]
fn test_handshake_state_machine_directly() {
    use desfire_apdu_core::{CardExecutor, Executor};

    let key = KeyReference::factory_master();
    let mut executor = CardExecutor::new(SimulatedCard::new());
    let mut rng = StdRng::seed_from_u64(42);

    let mut handshake = MutualAuthentication::new(&key, AuthMode::Legacy);
    assert_eq!(handshake.state(), AuthState::Idle);

    handshake.run(&mut executor, &mut rng).unwrap();
    assert_eq!(handshake.state(), AuthState::Verified);
    assert!(handshake.state().is_terminal());

    // One challenge, one token
    assert_eq!(executor.transport().instructions(), vec![0x0A, 0xAF]);
}

#[test]
fn test_reselect_drops_authentication() {
    let aid = ApplicationId::new(AID);
    let mut card = Desfire::new(SimulatedCard::new());

    card.create_application(aid, KeySettings::DEFAULT, 1).unwrap();
    card.select_application(aid).unwrap();
    card.authenticate(&KeyReference::factory_master(), AuthMode::Legacy)
        .unwrap();
    card.create_std_data_file(1, CommMode::Plain, AccessRights::FREE, 8)
        .unwrap();

    card.select_application(aid).unwrap();
    assert_eq!(*card.authentication(), AuthenticationState::Unauthenticated);
    assert_eq!(card.selected_application(), Some(aid));
}
