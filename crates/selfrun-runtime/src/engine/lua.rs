//! Lua 5.4 engine backed by the raw C API.
//!
//! Every call that may raise a Lua error runs under `lua_pcall`, so errors
//! come back as status codes instead of unwinding through Rust frames.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;

pub use mlua_sys as ffi;

use super::{ChunkSource, Engine};
use crate::args::Arguments;
use crate::error::{LaunchError, LoadError};

/// A native module opened together with the standard libraries.
///
/// It is required under `name` and also bound to the global of that name,
/// the way the stock interpreter exposes its own libraries.
#[derive(Debug, Clone, Copy)]
pub struct NativeModule {
    pub name: &'static CStr,
    pub open: ffi::lua_CFunction,
}

impl NativeModule {
    pub const fn new(name: &'static CStr, open: ffi::lua_CFunction) -> Self {
        Self { name, open }
    }
}

/// An owned `lua_State`. Closed on drop.
pub struct LuaEngine {
    state: *mut ffi::lua_State,
    /// Opened after the standard libraries, in order.
    modules: Vec<NativeModule>,
    /// A compiled chunk is sitting on top of the stack.
    pending: bool,
}

impl LuaEngine {
    /// Create a fresh Lua state with no libraries opened.
    pub fn new() -> Result<Self, LaunchError> {
        let state = unsafe { ffi::luaL_newstate() };
        if state.is_null() {
            return Err(LaunchError::EngineInit("not enough memory for state".to_string()));
        }
        Ok(Self {
            state,
            modules: Vec::new(),
            pending: false,
        })
    }

    /// Create a Lua state that also opens `modules` during
    /// [`open_libraries`](Engine::open_libraries).
    pub fn with_modules(modules: &[NativeModule]) -> Result<Self, LaunchError> {
        let mut engine = Self::new()?;
        engine.modules.extend_from_slice(modules);
        Ok(engine)
    }

    /// Queue one more module. Has no effect once libraries are open.
    pub fn register_module(&mut self, module: NativeModule) {
        self.modules.push(module);
    }

    /// Whether the garbage collector is currently running.
    pub fn collector_running(&self) -> bool {
        unsafe { ffi::lua_gc(self.state, ffi::LUA_GCISRUNNING, 0) != 0 }
    }

    /// Pop the error object on top of the stack and turn it into a message.
    fn pop_error(&mut self) -> String {
        unsafe {
            let mut len = 0usize;
            let msg = ffi::lua_tolstring(self.state, -1, &mut len);
            let text = if msg.is_null() {
                "(error object is not a string)".to_string()
            } else {
                let bytes = std::slice::from_raw_parts(msg as *const u8, len);
                String::from_utf8_lossy(bytes).into_owned()
            };
            ffi::lua_pop(self.state, 1);
            text
        }
    }
}

impl Drop for LuaEngine {
    fn drop(&mut self) {
        unsafe { ffi::lua_close(self.state) }
    }
}

impl Engine for LuaEngine {
    fn pause_collector(&mut self) {
        unsafe {
            ffi::lua_gc(self.state, ffi::LUA_GCSTOP, 0);
        }
    }

    fn resume_collector(&mut self) {
        unsafe {
            ffi::lua_gc(self.state, ffi::LUA_GCRESTART, 0);
        }
    }

    fn open_libraries(&mut self) -> Result<(), LaunchError> {
        let request = OpenRequest {
            modules: &self.modules,
        };
        tracing::debug!(extra_modules = self.modules.len(), "opening libraries");

        unsafe {
            ffi::lua_pushcfunction(self.state, open_libs);
            ffi::lua_pushlightuserdata(self.state, &request as *const OpenRequest<'_> as *mut c_void);
            if ffi::lua_pcall(self.state, 1, 0, 0) != ffi::LUA_OK {
                return Err(LaunchError::EngineInit(self.pop_error()));
            }
        }
        Ok(())
    }

    fn load(&mut self, chunk_name: &str, source: &mut dyn ChunkSource) -> Result<(), LaunchError> {
        let name = CString::new(chunk_name)
            .map_err(|_| LaunchError::EngineLoad(format!("invalid chunk name {chunk_name:?}")))?;
        let mut read = ReadState {
            source,
            error: None,
        };

        let status = unsafe {
            ffi::lua_load(
                self.state,
                read_chunk,
                &mut read as *mut ReadState<'_> as *mut c_void,
                name.as_ptr(),
                ptr::null(),
            )
        };

        if let Some(err) = read.error.take() {
            // Either the chunk or the syntax error it caused; neither is wanted.
            unsafe { ffi::lua_pop(self.state, 1) };
            return Err(err.into());
        }
        if status != ffi::LUA_OK {
            return Err(LaunchError::EngineLoad(self.pop_error()));
        }

        self.pending = true;
        Ok(())
    }

    fn set_arg_table(&mut self, global: &str, args: &Arguments) -> Result<(), LaunchError> {
        let global = CString::new(global)
            .map_err(|_| LaunchError::EngineRuntime(format!("invalid global name {global:?}")))?;
        let request = ArgTable {
            global: &global,
            entries: args.entries(),
        };

        unsafe {
            ffi::lua_pushcfunction(self.state, build_arg_table);
            ffi::lua_pushlightuserdata(self.state, &request as *const ArgTable<'_> as *mut c_void);
            if ffi::lua_pcall(self.state, 1, 0, 0) != ffi::LUA_OK {
                return Err(LaunchError::EngineRuntime(self.pop_error()));
            }
        }
        Ok(())
    }

    fn call(&mut self, args: &[String]) -> Result<(), LaunchError> {
        if !self.pending {
            return Err(LaunchError::EngineRuntime("no chunk loaded".to_string()));
        }

        let nargs = c_int::try_from(args.len())
            .ok()
            .filter(|&n| unsafe { ffi::lua_checkstack(self.state, n) } != 0)
            .ok_or_else(|| LaunchError::EngineRuntime("too many arguments to script".to_string()))?;

        self.pending = false;
        unsafe {
            for arg in args {
                ffi::lua_pushlstring(self.state, arg.as_ptr() as *const c_char, arg.len());
            }
            if ffi::lua_pcall(self.state, nargs, 0, 0) != ffi::LUA_OK {
                return Err(LaunchError::EngineRuntime(self.pop_error()));
            }
        }
        Ok(())
    }
}

struct OpenRequest<'a> {
    modules: &'a [NativeModule],
}

/// Protected body of `open_libraries`: argument 1 is a light userdata
/// pointing at an [`OpenRequest`].
unsafe extern "C-unwind" fn open_libs(state: *mut ffi::lua_State) -> c_int {
    let request = &*(ffi::lua_touserdata(state, 1) as *const OpenRequest<'_>);
    ffi::luaL_openlibs(state);
    for module in request.modules {
        ffi::luaL_requiref(state, module.name.as_ptr(), module.open, 1);
        ffi::lua_pop(state, 1);
    }
    0
}

/// Userdata handed to `lua_load` for the duration of one load.
struct ReadState<'a> {
    source: &'a mut dyn ChunkSource,
    error: Option<LoadError>,
}

/// `lua_Reader` over a [`ChunkSource`]. A read error ends the stream and is
/// parked in the state for `load` to report.
unsafe extern "C-unwind" fn read_chunk(
    _state: *mut ffi::lua_State,
    data: *mut c_void,
    size: *mut usize,
) -> *const c_char {
    let read = &mut *(data as *mut ReadState<'_>);
    match read.source.next_chunk() {
        Ok(Some(chunk)) => {
            *size = chunk.len();
            chunk.as_ptr() as *const c_char
        }
        Ok(None) => {
            *size = 0;
            ptr::null()
        }
        Err(err) => {
            read.error = Some(err);
            *size = 0;
            ptr::null()
        }
    }
}

struct ArgTable<'a> {
    global: &'a CStr,
    entries: &'a [String],
}

/// Protected body of `set_arg_table`: argument 1 is a light userdata
/// pointing at an [`ArgTable`].
unsafe extern "C-unwind" fn build_arg_table(state: *mut ffi::lua_State) -> c_int {
    let request = &*(ffi::lua_touserdata(state, 1) as *const ArgTable<'_>);
    let positional = c_int::try_from(request.entries.len().saturating_sub(1)).unwrap_or(c_int::MAX);

    ffi::lua_createtable(state, positional, 1);
    for (index, entry) in request.entries.iter().enumerate() {
        ffi::lua_pushlstring(state, entry.as_ptr() as *const c_char, entry.len());
        ffi::lua_rawseti(state, -2, index as ffi::lua_Integer);
    }
    ffi::lua_setglobal(state, request.global.as_ptr());
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    /// In-memory chunk source with a fixed chunk size.
    struct Pieces<'a> {
        data: &'a [u8],
        step: usize,
        fail_after: Option<usize>,
    }

    impl ChunkSource for Pieces<'_> {
        fn next_chunk(&mut self) -> Result<Option<&[u8]>, LoadError> {
            if let Some(0) = self.fail_after {
                return Err(LoadError::Read {
                    path: "payload".into(),
                    source: std::io::Error::other("disk on fire"),
                });
            }
            self.fail_after = self.fail_after.map(|n| n - 1);
            if self.data.is_empty() {
                return Ok(None);
            }
            let n = self.step.min(self.data.len());
            let (chunk, rest) = self.data.split_at(n);
            self.data = rest;
            Ok(Some(chunk))
        }
    }

    unsafe extern "C-unwind" fn open_answer(state: *mut ffi::lua_State) -> c_int {
        ffi::lua_createtable(state, 0, 1);
        ffi::lua_pushinteger(state, 42);
        ffi::lua_setfield(state, -2, c"value".as_ptr());
        1
    }

    static COLLECTOR_SEEN: AtomicI32 = AtomicI32::new(-1);

    unsafe extern "C-unwind" fn open_gc_witness(state: *mut ffi::lua_State) -> c_int {
        let running = ffi::lua_gc(state, ffi::LUA_GCISRUNNING, 0);
        COLLECTOR_SEEN.store(running, Ordering::SeqCst);
        ffi::lua_pushboolean(state, 1);
        1
    }

    fn ready_engine() -> LuaEngine {
        let mut engine = LuaEngine::new().unwrap();
        engine.open_libraries().unwrap();
        engine
    }

    fn load_str(engine: &mut LuaEngine, source: &str, step: usize) -> Result<(), LaunchError> {
        let mut pieces = Pieces {
            data: source.as_bytes(),
            step,
            fail_after: None,
        };
        engine.load("=test", &mut pieces)
    }

    #[test]
    fn test_collector_pause_resume() {
        let mut engine = LuaEngine::new().unwrap();
        assert!(engine.collector_running());
        engine.pause_collector();
        assert!(!engine.collector_running());
        engine.resume_collector();
        assert!(engine.collector_running());
    }

    #[test]
    fn test_load_across_tiny_chunks() {
        let mut engine = ready_engine();
        let source = "local a, b = ...\nassert(a + b == 5, 'sum')\nassert(string.rep('x', 3) == 'xxx')";
        load_str(&mut engine, source, 1).unwrap();
        engine.call(&["2".to_string(), "3".to_string()]).unwrap();
    }

    #[test]
    fn test_syntax_error_is_load_failure() {
        let mut engine = ready_engine();
        let err = load_str(&mut engine, "local = 1", 4).unwrap_err();
        match err {
            LaunchError::EngineLoad(msg) => assert!(msg.starts_with("test:1:"), "{msg}"),
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_error_wins_over_syntax_error() {
        let mut engine = ready_engine();
        let mut pieces = Pieces {
            data: b"print('never finished",
            step: 4,
            fail_after: Some(2),
        };
        let err = engine.load("=test", &mut pieces).unwrap_err();
        assert!(matches!(err, LaunchError::Payload(LoadError::Read { .. })), "{err:?}");
    }

    #[test]
    fn test_runtime_error_message() {
        let mut engine = ready_engine();
        load_str(&mut engine, "error('boom')", 64).unwrap();
        let err = engine.call(&[]).unwrap_err();
        match err {
            LaunchError::EngineRuntime(msg) => assert_eq!(msg, "test:1: boom"),
            other => panic!("expected runtime error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_string_error_object() {
        let mut engine = ready_engine();
        load_str(&mut engine, "error({})", 64).unwrap();
        let err = engine.call(&[]).unwrap_err();
        assert_eq!(err.to_string(), "(error object is not a string)");
    }

    #[test]
    fn test_arg_table() {
        let mut engine = ready_engine();
        let args = Arguments::new(["prog", "a", "b"]);
        engine.set_arg_table("arg", &args).unwrap();
        load_str(
            &mut engine,
            "assert(arg[0] == 'prog' and arg[1] == 'a' and arg[2] == 'b' and #arg == 2)",
            64,
        )
        .unwrap();
        engine.call(args.forwarded()).unwrap();
    }

    #[test]
    fn test_call_without_chunk() {
        let mut engine = ready_engine();
        assert!(matches!(engine.call(&[]), Err(LaunchError::EngineRuntime(_))));
    }

    #[test]
    fn test_native_module_visible_to_chunk() {
        let mut engine = LuaEngine::with_modules(&[NativeModule::new(c"answer", open_answer)]).unwrap();
        engine.open_libraries().unwrap();
        load_str(
            &mut engine,
            "assert(answer.value == 42)\nassert(require('answer') == answer)\nassert(package.loaded.answer == answer)",
            8,
        )
        .unwrap();
        engine.call(&[]).unwrap();
    }

    #[test]
    fn test_native_module_opens_with_collector_paused() {
        let mut engine = LuaEngine::new().unwrap();
        engine.register_module(NativeModule::new(c"gcwitness", open_gc_witness));
        engine.pause_collector();
        engine.open_libraries().unwrap();
        engine.resume_collector();

        assert_eq!(COLLECTOR_SEEN.load(Ordering::SeqCst), 0);
        assert!(engine.collector_running());
    }
}
