use jni_sys::{jboolean, jclass, jvalue, JNI_FALSE, JNI_TRUE};
use serde::{Deserialize, Serialize};

use crate::lib::errors::NativeError;

use super::JniInstance;

const LAUNCHER_HELPER: &str = "sun/launcher/LauncherHelper";

/// How the main target is named; values match `LauncherHelper`'s modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchMode {
    Class,
    Jar,
    Module,
}

impl LaunchMode {
    pub fn helper_mode(self) -> i32 {
        match self {
            LaunchMode::Class => 1,
            LaunchMode::Jar => 2,
            LaunchMode::Module => 3,
        }
    }
}

fn flag(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

impl JniInstance<'_> {
    /// Print the runtime's version banner.
    pub fn print_version(&self, major_version: u32, to_stderr: bool) -> Result<(), NativeError> {
        if major_version >= 9 {
            let class = self.find_class("java/lang/VersionProps")?;
            let result = self
                .static_method(class, "print", "(Z)V")
                .and_then(|method| {
                    self.call_static_void(class, method, &[jvalue { z: flag(to_stderr) }])
                });
            self.delete_local(class);
            result
        } else {
            let class = self.find_class("sun/misc/Version")?;
            let result = self
                .static_method(class, "print", "()V")
                .and_then(|method| self.call_static_void(class, method, &[]));
            self.delete_local(class);
            result
        }
    }

    pub fn list_modules(&self) -> Result<(), NativeError> {
        let helper = self.find_class(LAUNCHER_HELPER)?;
        let result = self
            .static_method(helper, "listModules", "()V")
            .and_then(|method| self.call_static_void(helper, method, &[]));
        self.delete_local(helper);
        result
    }

    pub fn describe_module(&self, module: &str) -> Result<(), NativeError> {
        let helper = self.find_class(LAUNCHER_HELPER)?;
        let result = self
            .static_method(helper, "describeModule", "(Ljava/lang/String;)V")
            .and_then(|method| {
                let name = self.new_string(module)?;
                let called = self.call_static_void(helper, method, &[jvalue { l: name }]);
                self.delete_local(name);
                called
            });
        self.delete_local(helper);
        result
    }

    /// Load the main class without running it.
    pub fn check_main(&self, mode: LaunchMode, target: &str) -> Result<(), NativeError> {
        let main_class = self.load_main(mode, target)?;
        self.delete_local(main_class);
        Ok(())
    }

    /// Load the main class through the launcher helper and run `main(String[])`.
    pub fn run_main(
        &self,
        mode: LaunchMode,
        target: &str,
        args: &[String],
    ) -> Result<(), NativeError> {
        let main_class = self.load_main(mode, target)?;
        let result = self
            .static_method(main_class, "main", "([Ljava/lang/String;)V")
            .and_then(|method| {
                let argv = self.new_string_array(args)?;
                let called = self.call_static_void(main_class, method, &[jvalue { l: argv }]);
                self.delete_local(argv);
                called
            });
        self.delete_local(main_class);
        result
    }

    fn load_main(&self, mode: LaunchMode, target: &str) -> Result<jclass, NativeError> {
        let helper = self.find_class(LAUNCHER_HELPER)?;
        let main_class = self
            .static_method(
                helper,
                "checkAndLoadMain",
                "(ZILjava/lang/String;)Ljava/lang/Class;",
            )
            .and_then(|method| {
                let what = self.new_string(target)?;
                let loaded = self.call_static_object(
                    helper,
                    method,
                    &[
                        jvalue { z: JNI_TRUE },
                        jvalue {
                            i: mode.helper_mode(),
                        },
                        jvalue { l: what },
                    ],
                );
                self.delete_local(what);
                loaded
            });
        self.delete_local(helper);

        let main_class = main_class?;
        if main_class.is_null() {
            return Err(NativeError::Call {
                message: format!("main class for {target} could not be loaded"),
            });
        }
        Ok(main_class)
    }
}
