//! Networks of the critique agents implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! Each network implements the collaborator traits of `critique_core::base`, so it
//! can be plugged into the agents of `critique_core::agent`:
//!
//! * [`MlpPolicy`](policy::MlpPolicy): categorical or Gaussian policy with an
//!   optional value baseline, for [`Pg`](critique_core::agent::Pg) and
//!   [`Awac`](critique_core::agent::Awac),
//! * [`SacActor`](sac::SacActor): tanh-squashed Gaussian actor with a learned
//!   temperature, for [`Sac`](critique_core::agent::Sac),
//! * [`QNetwork`](q_network::QNetwork): action-value function with a target copy,
//! * [`RndModel`](rnd::RndModel): random network distillation novelty bonus.
pub mod mlp;
pub mod opt;
pub mod policy;
pub mod q_network;
pub mod rnd;
pub mod sac;
pub mod util;
use critique_core::agent::{Awac, Pg, Sac};
use serde::{Deserialize, Serialize};

/// Policy-gradient agent with an MLP policy.
pub type MlpPg = Pg<policy::MlpPolicy>;

/// SAC agent with MLP networks.
pub type MlpSac = Sac<sac::SacActor>;

/// AWAC agent with MLP networks and an RND novelty bonus.
pub type MlpAwac = Awac<policy::MlpPolicy, q_network::QNetwork, rnd::RndModel>;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    fn try_from(device: Device) -> anyhow::Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}
