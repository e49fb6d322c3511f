use std::{
    ffi::{c_char, c_void, CStr, CString},
    marker::PhantomData,
    os::unix::ffi::OsStrExt,
    path::Path,
    ptr,
};

use jni_sys::{
    jclass, jint, jmethodID, jobject, jsize, jstring, jvalue, JNIEnv, JavaVM, JavaVMInitArgs,
    JavaVMOption, JNI_FALSE, JNI_OK, JNI_TRUE,
};
use tracing::debug;

use crate::lib::errors::NativeError;

use super::{NativeLibrary, RuntimeInstance};

const CREATE_INSTANCE_SYMBOL: &str = "JNI_CreateJavaVM";
const DEFAULT_INIT_ARGS_SYMBOL: &str = "JNI_GetDefaultJavaVMInitArgs";
const CREATED_INSTANCES_SYMBOL: &str = "JNI_GetCreatedJavaVMs";

/// Entry points a runtime library must export, in binding order.
pub const REQUIRED_SYMBOLS: [&str; 3] = [
    CREATE_INSTANCE_SYMBOL,
    DEFAULT_INIT_ARGS_SYMBOL,
    CREATED_INSTANCES_SYMBOL,
];

type CreateJavaVmFn =
    unsafe extern "system" fn(*mut *mut JavaVM, *mut *mut c_void, *mut c_void) -> jint;
type GetDefaultJavaVmInitArgsFn = unsafe extern "system" fn(*mut c_void) -> jint;
type GetCreatedJavaVmsFn = unsafe extern "system" fn(*mut *mut JavaVM, jsize, *mut jsize) -> jint;

/// Look up a function in the JNI function table, failing if the slot is empty.
macro_rules! jni_fn {
    ($env:expr, $name:ident) => {
        (**$env).$name.ok_or(NativeError::MissingFunction {
            name: stringify!($name),
        })
    };
}

/// `dlopen` handle closed on drop.
struct LibraryHandle(*mut c_void);

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful dlopen and is closed once.
        unsafe {
            libc::dlclose(self.0);
        }
    }
}

/// A runtime library bound through `dlopen`/`dlsym`.
pub struct JniLibrary {
    create_vm: CreateJavaVmFn,
    default_init_args: GetDefaultJavaVmInitArgsFn,
    created_vms: GetCreatedJavaVmsFn,
    _handle: LibraryHandle,
}

impl JniLibrary {
    /// Load the library and bind the three required entry points.
    pub fn open(path: &Path) -> Result<Self, NativeError> {
        let c_path =
            CString::new(path.as_os_str().as_bytes()).map_err(|err| NativeError::Open {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        debug!(target: "jlaunch::native", path = %path.display(), "dlopen");
        let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if raw.is_null() {
            return Err(NativeError::Open {
                path: path.to_path_buf(),
                message: last_dl_error(),
            });
        }
        let handle = LibraryHandle(raw);

        // SAFETY: each symbol is resolved from a JNI invocation library and
        // has the documented C signature of the matching function type.
        let create_vm = unsafe {
            std::mem::transmute::<*mut c_void, CreateJavaVmFn>(lookup(
                &handle,
                path,
                CREATE_INSTANCE_SYMBOL,
            )?)
        };
        let default_init_args = unsafe {
            std::mem::transmute::<*mut c_void, GetDefaultJavaVmInitArgsFn>(lookup(
                &handle,
                path,
                DEFAULT_INIT_ARGS_SYMBOL,
            )?)
        };
        let created_vms = unsafe {
            std::mem::transmute::<*mut c_void, GetCreatedJavaVmsFn>(lookup(
                &handle,
                path,
                CREATED_INSTANCES_SYMBOL,
            )?)
        };

        Ok(Self {
            create_vm,
            default_init_args,
            created_vms,
            _handle: handle,
        })
    }

    /// Create the process-wide instance with the given native options.
    pub fn create_jni_instance(
        &self,
        options: &[String],
        abi_version: i32,
        ignore_unrecognized: bool,
    ) -> Result<JniInstance<'_>, NativeError> {
        let option_strings = options
            .iter()
            .map(|option| CString::new(option.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| NativeError::InvalidString {
                message: err.to_string(),
            })?;
        let mut raw_options: Vec<JavaVMOption> = option_strings
            .iter()
            .map(|option| JavaVMOption {
                optionString: option.as_ptr() as *mut c_char,
                extraInfo: ptr::null_mut(),
            })
            .collect();
        let option_count = jint::try_from(raw_options.len()).map_err(|_| {
            NativeError::InvalidString {
                message: format!("too many runtime options ({})", raw_options.len()),
            }
        })?;

        let mut init_args = JavaVMInitArgs {
            version: abi_version,
            nOptions: option_count,
            options: raw_options.as_mut_ptr(),
            ignoreUnrecognized: if ignore_unrecognized {
                JNI_TRUE
            } else {
                JNI_FALSE
            },
        };

        let mut vm: *mut JavaVM = ptr::null_mut();
        let mut env: *mut c_void = ptr::null_mut();
        debug!(
            target: "jlaunch::native",
            options = option_count,
            abi_version = abi_version,
            "CreateJavaVM"
        );
        // SAFETY: init_args and the option strings outlive the call; the
        // runtime copies what it keeps.
        let status = unsafe {
            (self.create_vm)(
                &mut vm,
                &mut env,
                &mut init_args as *mut JavaVMInitArgs as *mut c_void,
            )
        };
        if status != JNI_OK || vm.is_null() || env.is_null() {
            return Err(NativeError::CreateFailed { status });
        }

        Ok(JniInstance {
            vm,
            env: env as *mut JNIEnv,
            _library: PhantomData,
        })
    }
}

impl NativeLibrary for JniLibrary {
    fn created_instances(&self) -> Result<i32, NativeError> {
        let mut vm: *mut JavaVM = ptr::null_mut();
        let mut count: jsize = 0;
        let status = unsafe { (self.created_vms)(&mut vm, 1, &mut count) };
        if status != JNI_OK {
            return Err(NativeError::Call {
                message: format!("{CREATED_INSTANCES_SYMBOL} returned {status}"),
            });
        }
        Ok(count)
    }

    fn supports_abi(&self, version: i32) -> Result<bool, NativeError> {
        let mut init_args = JavaVMInitArgs {
            version,
            nOptions: 0,
            options: ptr::null_mut(),
            ignoreUnrecognized: JNI_FALSE,
        };
        let status = unsafe {
            (self.default_init_args)(&mut init_args as *mut JavaVMInitArgs as *mut c_void)
        };
        Ok(status == JNI_OK)
    }

    fn create_instance(
        &self,
        options: &[String],
        abi_version: i32,
        ignore_unrecognized: bool,
    ) -> Result<Box<dyn RuntimeInstance + '_>, NativeError> {
        let instance = self.create_jni_instance(options, abi_version, ignore_unrecognized)?;
        Ok(Box::new(instance))
    }
}

fn lookup(handle: &LibraryHandle, path: &Path, symbol: &'static str) -> Result<*mut c_void, NativeError> {
    let missing = || NativeError::MissingSymbol {
        path: path.to_path_buf(),
        symbol,
    };
    let c_symbol = CString::new(symbol).map_err(|_| missing())?;
    let address = unsafe { libc::dlsym(handle.0, c_symbol.as_ptr()) };
    if address.is_null() {
        return Err(missing());
    }
    Ok(address)
}

fn last_dl_error() -> String {
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        return "unknown dlopen failure".into();
    }
    unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .into_owned()
}

/// The live instance created from a [`JniLibrary`]; destroyed on drop.
pub struct JniInstance<'lib> {
    vm: *mut JavaVM,
    env: *mut JNIEnv,
    _library: PhantomData<&'lib JniLibrary>,
}

impl Drop for JniInstance<'_> {
    fn drop(&mut self) {
        debug!(target: "jlaunch::native", "DestroyJavaVM");
        // SAFETY: vm was returned by a successful CreateJavaVM and is
        // destroyed exactly once, from the creating thread.
        unsafe {
            if let Some(destroy) = (**self.vm).DestroyJavaVM {
                destroy(self.vm);
            }
        }
    }
}

impl RuntimeInstance for JniInstance<'_> {
    fn abi_version(&self) -> Result<i32, NativeError> {
        unsafe {
            let get_version = jni_fn!(self.env, GetVersion)?;
            Ok(get_version(self.env))
        }
    }

    fn get_property(&self, key: &str) -> Result<Option<String>, NativeError> {
        let system = self.find_class("java/lang/System")?;
        let result = self.read_property(system, key);
        self.delete_local(system);
        result
    }
}

impl JniInstance<'_> {
    fn read_property(&self, system: jclass, key: &str) -> Result<Option<String>, NativeError> {
        let get_property = self.static_method(
            system,
            "getProperty",
            "(Ljava/lang/String;)Ljava/lang/String;",
        )?;
        let key_string = self.new_string(key)?;
        let value = self.call_static_object(system, get_property, &[jvalue { l: key_string }]);
        self.delete_local(key_string);

        let value = value?;
        if value.is_null() {
            return Ok(None);
        }
        let text = self.string_value(value);
        self.delete_local(value);
        text.map(Some)
    }

    pub(super) fn find_class(&self, name: &str) -> Result<jclass, NativeError> {
        let c_name = to_c_string(name)?;
        let class = unsafe {
            let find_class = jni_fn!(self.env, FindClass)?;
            find_class(self.env, c_name.as_ptr())
        };
        self.check_exception(|| format!("class {name} could not be loaded"))?;
        if class.is_null() {
            return Err(NativeError::Call {
                message: format!("class {name} not found"),
            });
        }
        Ok(class)
    }

    pub(super) fn static_method(
        &self,
        class: jclass,
        name: &str,
        signature: &str,
    ) -> Result<jmethodID, NativeError> {
        let c_name = to_c_string(name)?;
        let c_signature = to_c_string(signature)?;
        let method = unsafe {
            let get_static_method = jni_fn!(self.env, GetStaticMethodID)?;
            get_static_method(self.env, class, c_name.as_ptr(), c_signature.as_ptr())
        };
        self.check_exception(|| format!("static method {name}{signature} lookup failed"))?;
        if method.is_null() {
            return Err(NativeError::Call {
                message: format!("static method {name}{signature} not found"),
            });
        }
        Ok(method)
    }

    pub(super) fn new_string(&self, value: &str) -> Result<jstring, NativeError> {
        let c_value = to_c_string(value)?;
        let string = unsafe {
            let new_string = jni_fn!(self.env, NewStringUTF)?;
            new_string(self.env, c_value.as_ptr())
        };
        self.check_exception(|| "string allocation failed".to_string())?;
        Ok(string)
    }

    pub(super) fn string_value(&self, string: jstring) -> Result<String, NativeError> {
        unsafe {
            let get_chars = jni_fn!(self.env, GetStringUTFChars)?;
            let release_chars = jni_fn!(self.env, ReleaseStringUTFChars)?;
            let chars = get_chars(self.env, string, ptr::null_mut());
            if chars.is_null() {
                return Err(NativeError::Call {
                    message: "string contents unavailable".into(),
                });
            }
            let text = CStr::from_ptr(chars).to_string_lossy().into_owned();
            release_chars(self.env, string, chars);
            Ok(text)
        }
    }

    pub(super) fn call_static_object(
        &self,
        class: jclass,
        method: jmethodID,
        args: &[jvalue],
    ) -> Result<jobject, NativeError> {
        let result = unsafe {
            let call = jni_fn!(self.env, CallStaticObjectMethodA)?;
            call(self.env, class, method, args.as_ptr())
        };
        self.check_exception(|| "static call threw an exception".to_string())?;
        Ok(result)
    }

    pub(super) fn call_static_void(
        &self,
        class: jclass,
        method: jmethodID,
        args: &[jvalue],
    ) -> Result<(), NativeError> {
        unsafe {
            let call = jni_fn!(self.env, CallStaticVoidMethodA)?;
            call(self.env, class, method, args.as_ptr());
        }
        self.check_exception(|| "static call threw an exception".to_string())
    }

    pub(super) fn new_string_array(&self, values: &[String]) -> Result<jobject, NativeError> {
        let string_class = self.find_class("java/lang/String")?;
        let length = jsize::try_from(values.len()).map_err(|_| NativeError::Call {
            message: format!("too many arguments ({})", values.len()),
        })?;
        let array = unsafe {
            let new_array = jni_fn!(self.env, NewObjectArray)?;
            new_array(self.env, length, string_class, ptr::null_mut())
        };
        self.delete_local(string_class);
        self.check_exception(|| "argument array allocation failed".to_string())?;

        for (index, value) in (0..length).zip(values) {
            let element = self.new_string(value)?;
            unsafe {
                let set_element = jni_fn!(self.env, SetObjectArrayElement)?;
                set_element(self.env, array, index, element);
            }
            self.delete_local(element);
        }
        Ok(array)
    }

    pub(super) fn delete_local(&self, object: jobject) {
        if object.is_null() {
            return;
        }
        unsafe {
            if let Some(delete_local_ref) = (**self.env).DeleteLocalRef {
                delete_local_ref(self.env, object);
            }
        }
    }

    /// Describe and clear a pending exception, turning it into an error.
    fn check_exception(&self, context: impl FnOnce() -> String) -> Result<(), NativeError> {
        unsafe {
            let exception_check = jni_fn!(self.env, ExceptionCheck)?;
            if exception_check(self.env) == JNI_FALSE {
                return Ok(());
            }
            if let Some(describe) = (**self.env).ExceptionDescribe {
                describe(self.env);
            }
            if let Some(clear) = (**self.env).ExceptionClear {
                clear(self.env);
            }
        }
        Err(NativeError::Call { message: context() })
    }
}

fn to_c_string(value: &str) -> Result<CString, NativeError> {
    CString::new(value).map_err(|err| NativeError::InvalidString {
        message: err.to_string(),
    })
}
