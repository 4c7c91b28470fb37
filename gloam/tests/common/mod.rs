use std::rc::Rc;

use gloam::context::Context;
use gloam::driver::headless::{HeadlessDriver, HeadlessPlatform};
use gloam::environment::Profile;
use gloam::registry::ContextRegistry;

pub fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

/// A current context over a fresh headless driver, with an empty call log.
pub fn context(profile: Profile) -> (Context<HeadlessDriver>, HeadlessDriver) {
  init_logger();

  let driver = HeadlessDriver::new(profile);
  let platform: Rc<HeadlessPlatform> = HeadlessPlatform::new();
  let ctx = Context::create_from_existing(platform, driver.clone(), &ContextRegistry::new())
    .expect("headless context");

  driver.clear_calls();
  (ctx, driver)
}
