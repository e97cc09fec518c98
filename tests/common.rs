//! Test utilities & fixtures shared by the integration tests.

use std::sync::Arc;

use soulbound::journey::{CurrencyConfig, JourneyData, JourneyState};
use soulbound::remote::{MemoryRemoteStore, StaticAuthProvider};
use soulbound::session::{Role, Session};
use soulbound::sync::Bootstrap;

pub const PLAYER_EMAIL: &str = "lumine@teyvat.io";
pub const ADMIN_EMAIL: &str = "paimon@teyvat.io";

#[allow(dead_code)]
pub fn player() -> Session {
    Session::new("u-player", PLAYER_EMAIL, "lumine", "tok-player", Role::Player)
}

#[allow(dead_code)]
pub fn admin() -> Session {
    Session::new("u-admin", ADMIN_EMAIL, "paimon", "tok-admin", Role::Admin)
}

/// Compiled-in journey with the prologue already watched, parked on the selection screen.
#[allow(dead_code)]
pub fn fresh_state(role: Role) -> JourneyState {
    let config = CurrencyConfig::default();
    let mut data = JourneyData::defaults(&config.defaults);
    data.flags.prologue_watched = true;
    JourneyState::new(data, role, config)
}

/// Bootstrap wired to an in-memory store and a provider already holding `session`.
#[allow(dead_code)]
pub fn bootstrap_for(session: Session, store: Arc<MemoryRemoteStore>) -> Bootstrap {
    Bootstrap::new(
        Arc::new(StaticAuthProvider::signed_in(session)),
        store,
        CurrencyConfig::default(),
    )
}
