//! Words used by the transform as static symbols (`Atom`)

use swc_core::ecma::atoms::Atom;

lazy_static! {
    /// Module recognized when no `modules` are configured
    pub static ref HTMLBARS_INLINE_PRECOMPILE: Atom = Atom::from("htmlbars-inline-precompile");
    pub static ref DEFAULT: Atom = Atom::from("default");

    // `Ember.HTMLBars.template`
    pub static ref EMBER: Atom = Atom::from("Ember");
    pub static ref HTMLBARS: Atom = Atom::from("HTMLBars");
    pub static ref TEMPLATE: Atom = Atom::from("template");
}
