#![allow(clippy::missing_safety_doc)]
#![warn(missing_docs)]
/*!
Vulkan capability probe built on [`ash`].

- ✅ Instance version
- ✅ Instance layers, with the extensions each one provides
- ✅ Global instance extensions
- ✅ Instance creation with a debug messenger chained into the create call

Every enumeration uses the two-call pattern through
[`enumerate::enumerate_two_call`]. The loader sits behind [`CapabilityApi`],
so the whole report can be produced against a mock.

## Example

```rust,no_run
use vkprobe::{probe, ProbeOptions, Session, VulkanLoader};

let mut session = Session::with_loader(VulkanLoader::load()?);
probe::run(&mut session, &ProbeOptions::new(), &mut std::io::stdout())?;
// The instance is destroyed when `session` goes out of scope.
# Ok::<(), vkprobe::ProbeError>(())
```

## Licensing

This project is licensed under the [zlib License].

[zlib License]: https://opensource.org/licenses/Zlib
*/

pub mod debug;
pub mod enumerate;
pub mod error;
pub mod instance;
pub mod loader;
pub mod probe;
pub mod report;
pub mod session;
pub mod version;

#[cfg(test)]
mod testing;

pub use error::*;
pub use instance::*;
pub use loader::*;
pub use probe::{ProbeOptions, ProbeStage};
pub use session::*;
pub use version::*;

type ProbeSmallVec<T> = smallvec::SmallVec<[T; 8]>;
