use std::rc::Rc;

use crate::foundation::core::Slot;
use crate::material::Material;
use crate::ptex::texture::{ParameterTexture, Registration};

/// Capability of anything that can hold a row in a [`ParameterTexture`].
///
/// The texture only ever touches these accessors.
pub trait ParameterTarget {
    fn parameter_slot(&self) -> Slot;

    fn set_parameter_slot(&mut self, slot: Slot);

    /// The texture this target registers with.
    fn ptex(&self) -> &Rc<ParameterTexture>;

    /// Material that samples the texture, if the target has one yet.
    fn ptex_material(&mut self) -> Option<&mut Material> {
        None
    }
}

/// Register `target` with its own texture.
pub fn register(target: &mut dyn ParameterTarget) -> Registration {
    let ptex = Rc::clone(target.ptex());
    ptex.register(target)
}

/// Release `target`'s row in its own texture.
pub fn unregister(target: &mut dyn ParameterTarget) -> bool {
    let ptex = Rc::clone(target.ptex());
    ptex.unregister(target)
}
