use dblink_core::err::{bail, Context, Result};
use dblink_logging::debug;
use jni::{objects::JObject, InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use once_cell::sync::OnceCell;

use crate::DriverArtifactSet;

// The jni invocation api only permits one JVM per process
static JVM: OnceCell<JavaVM> = OnceCell::new();

/// Wrapper for booting and interacting with the in-process JVM
pub struct Jvm {
    jvm: &'static JavaVM,
}

impl Jvm {
    /// Boots the process JVM with the supplied artifacts on the class path,
    /// or attaches to the already-booted JVM.
    ///
    /// The class path is fixed by whichever bridge dials first: artifact
    /// sets of later bridges must already be on that class path.
    pub fn boot(artifacts: &DriverArtifactSet) -> Result<Self> {
        let jvm = JVM.get_or_try_init(|| -> Result<JavaVM> {
            let class_path = artifacts.class_path();
            debug!("Booting JVM with class path {}", class_path);

            let jvm_args = InitArgsBuilder::new()
                .version(JNIVersion::V8)
                .option(&format!("-Djava.class.path={}", class_path))
                .build()
                .context("Failed to init JVM args")?;

            JavaVM::new(jvm_args).context("Failed to boot JVM")
        })?;

        Ok(Self { jvm })
    }

    /// Attaches the current thread to the JVM
    pub fn env(&self) -> Result<JNIEnv> {
        self.jvm
            .attach_current_thread_permanently()
            .context("Failed to attach current thread to JVM")
    }

    /// Executes the supplied function in a local frame
    pub fn with_local_frame<F, R>(&self, local_ref_capacity: i32, cb: F) -> Result<R>
    where
        F: FnOnce(&JNIEnv) -> Result<R>,
    {
        let env = self.env()?;
        env.push_local_frame(local_ref_capacity)
            .context("Failed to push local frame")?;

        let ret = cb(&env);

        env.pop_local_frame(JObject::null())
            .context("Failed to pop local frame")?;

        ret
    }

    /// Checks for a pending Java exception, clearing it and surfacing its
    /// own message (the driver-reported failure) if present
    pub fn check_exceptions(&self, env: &JNIEnv) -> Result<()> {
        if env
            .exception_check()
            .context("Failed to check for exception")?
        {
            let exception = env
                .exception_occurred()
                .context("Failed to get pending exception")?;
            env.exception_clear().context("Failed to clear exception")?;

            let message: String = env
                .call_method(exception, "toString", "()Ljava/lang/String;", &[])
                .ok()
                .and_then(|ret| ret.l().ok())
                .and_then(|obj| env.get_string(obj.into()).ok())
                .map(|msg| msg.into())
                .unwrap_or_else(|| "unknown error".to_string());

            bail!("Java exception occurred: {}", message)
        }

        Ok(())
    }
}
