//! Functional-unit state.
//!
//! One register mirror per pipeline stage. Together they are the complete,
//! restorable hardware configuration of a logical context:
//! - mutators update the mirror and queue the matching register writes
//! - [`FunctionalUnits::restore`] replays every stage after the device was
//!   lost to another context or the register queue overflowed
//!
//! Replay order is fixed (global, host, primitive, rasterizer, fragment,
//! compat) because later stages depend on earlier ones being configured.

mod compat;
mod fragment;
mod global;
mod host;
mod primitive;
mod rasterizer;

pub use compat::{CompatState, TexControl, TextureEnv, TextureUnitState};
pub use fragment::{
    AlphaTestData, BlendControl, ColorBufMask, CompareFunc, DepthBufMask, DepthTestData,
    FragmentState, FramebufferControl, LogOpControl, ScissorTestData, StencilTestData,
};
pub use global::GlobalState;
pub use host::{Attribute, HostInterface, HostState, VertexBufferControl};
pub use primitive::{PrimitiveState, PrimitiveType, VertexContext};
pub use rasterizer::{
    ClippingControl, CullFace, CullingControl, LodControl, MAX_CLIP_COORD, RasterizerState,
};

use crate::device::{RegisterWindow, Registers};

/// Every stage of one logical context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionalUnits {
    pub global: GlobalState,
    pub host: HostState,
    pub primitive: PrimitiveState,
    pub rasterizer: RasterizerState,
    pub fragment: FragmentState,
    pub compat: CompatState,
}

impl FunctionalUnits {
    /// Re-emits every stage register in canonical order.
    pub(crate) fn restore<W: RegisterWindow>(&mut self, regs: &mut Registers<W>) {
        self.global.restore(regs);
        self.host.restore(regs);
        self.primitive.restore(regs);
        self.rasterizer.restore(regs);
        self.fragment.restore(regs);
        self.compat.restore(regs);
    }
}
