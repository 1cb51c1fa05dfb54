//! The closed set of hardware models.

use std::sync::Arc;

use kc_ac1::Ac1;
use kc_core::{HardwareModel, Host, RomCache, RomLoader};
use kc_spectrum::Spectrum;
use log::info;

use crate::config::{MachineConfig, MachineKind};

/// One hardware model, chosen at construction.
pub enum Machine {
    Spectrum(Box<Spectrum>),
    Ac1(Box<Ac1>),
}

impl Machine {
    /// Build the configured machine with flat RAM and no audio.
    #[must_use]
    pub fn new(config: &MachineConfig, roms: Arc<dyn RomLoader>, rom_cache: Arc<RomCache>) -> Self {
        Self::with_host(config, Host::new(roms, rom_cache))
    }

    /// Build the configured machine around the host's collaborators. The
    /// power-on policy in `config` replaces the host's.
    #[must_use]
    pub fn with_host(config: &MachineConfig, host: Host) -> Self {
        let host = host
            .with_ram_init(config.ram_init)
            .with_rom_reload(config.reload_roms_on_power_on);
        let machine = match config.kind {
            MachineKind::Spectrum => {
                Self::Spectrum(Box::new(Spectrum::new(config.spectrum.clone(), host)))
            }
            MachineKind::Ac1 => Self::Ac1(Box::new(Ac1::new(config.ac1.clone(), host))),
        };
        if let Some(khz) = config.speed_khz {
            machine.model().speed_control().set_khz(khz);
        }
        info!(
            "created {} at {} kHz",
            machine.model().title(),
            machine.model().speed_control().khz()
        );
        machine
    }

    #[must_use]
    pub fn kind(&self) -> MachineKind {
        match self {
            Self::Spectrum(_) => MachineKind::Spectrum,
            Self::Ac1(_) => MachineKind::Ac1,
        }
    }

    #[must_use]
    pub fn model(&self) -> &dyn HardwareModel {
        match self {
            Self::Spectrum(spectrum) => spectrum.as_ref(),
            Self::Ac1(ac1) => ac1.as_ref(),
        }
    }

    pub fn model_mut(&mut self) -> &mut dyn HardwareModel {
        match self {
            Self::Spectrum(spectrum) => spectrum.as_mut(),
            Self::Ac1(ac1) => ac1.as_mut(),
        }
    }

    /// Give up the variant and keep only the model.
    #[must_use]
    pub fn into_model(self) -> Box<dyn HardwareModel> {
        match self {
            Self::Spectrum(spectrum) => spectrum,
            Self::Ac1(ac1) => ac1,
        }
    }
}
