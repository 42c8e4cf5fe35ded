use gl::types::*;
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::ffi::CString;
use std::ptr;

pub struct ShaderProgram {
    id: GLuint,
    // Uniform lookups hit every frame; cache the locations after first use.
    locations: HashMap<&'static str, GLint>,
}

impl ShaderProgram {
    pub fn from_sources(vert_src: &str, frag_src: &str) -> Result<Self, String> {
        unsafe {
            let vs = compile_shader(vert_src, gl::VERTEX_SHADER)?;
            let fs = compile_shader(frag_src, gl::FRAGMENT_SHADER)?;
            let program = link_program(vs, fs);
            gl::DeleteShader(vs);
            gl::DeleteShader(fs);
            Ok(Self {
                id: program?,
                locations: HashMap::new(),
            })
        }
    }

    pub fn bind(&self) {
        unsafe {
            gl::UseProgram(self.id);
        }
    }

    fn location(&mut self, name: &'static str) -> GLint {
        if let Some(&loc) = self.locations.get(name) {
            return loc;
        }
        let cname = CString::new(name).unwrap_or_default();
        let loc = unsafe { gl::GetUniformLocation(self.id, cname.as_ptr()) };
        self.locations.insert(name, loc);
        loc
    }

    pub fn set_mat4(&mut self, name: &'static str, m: &Mat4) {
        let loc = self.location(name);
        unsafe {
            gl::UniformMatrix4fv(loc, 1, gl::FALSE, m.to_cols_array().as_ptr());
        }
    }

    pub fn set_vec3(&mut self, name: &'static str, v: Vec3) {
        let loc = self.location(name);
        unsafe {
            gl::Uniform3f(loc, v.x, v.y, v.z);
        }
    }

    pub fn set_vec4(&mut self, name: &'static str, v: [f32; 4]) {
        let loc = self.location(name);
        unsafe {
            gl::Uniform4f(loc, v[0], v[1], v[2], v[3]);
        }
    }

    pub fn set_float(&mut self, name: &'static str, v: f32) {
        let loc = self.location(name);
        unsafe {
            gl::Uniform1f(loc, v);
        }
    }

    pub fn set_int(&mut self, name: &'static str, v: i32) {
        let loc = self.location(name);
        unsafe {
            gl::Uniform1i(loc, v);
        }
    }

    pub fn set_vec3_array(&mut self, name: &'static str, values: &[Vec3]) {
        let loc = self.location(name);
        let flat: Vec<f32> = values.iter().flat_map(|v| [v.x, v.y, v.z]).collect();
        unsafe {
            gl::Uniform3fv(loc, values.len() as GLsizei, flat.as_ptr());
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

unsafe fn compile_shader(src: &str, shader_type: GLenum) -> Result<GLuint, String> {
    let shader = gl::CreateShader(shader_type);
    let c_src = CString::new(src).map_err(|e| e.to_string())?;
    gl::ShaderSource(shader, 1, &c_src.as_ptr(), ptr::null());
    gl::CompileShader(shader);

    let mut status: GLint = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
    if status == gl::TRUE as GLint {
        return Ok(shader);
    }

    let mut len: GLint = 0;
    gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
    let mut log = vec![0u8; len.max(1) as usize];
    gl::GetShaderInfoLog(shader, len, ptr::null_mut(), log.as_mut_ptr() as *mut _);
    gl::DeleteShader(shader);
    Err(String::from_utf8_lossy(&log).trim_end_matches('\0').to_string())
}

unsafe fn link_program(vs: GLuint, fs: GLuint) -> Result<GLuint, String> {
    let program = gl::CreateProgram();
    gl::AttachShader(program, vs);
    gl::AttachShader(program, fs);
    gl::LinkProgram(program);

    let mut status: GLint = 0;
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
    if status == gl::TRUE as GLint {
        return Ok(program);
    }

    let mut len: GLint = 0;
    gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    let mut log = vec![0u8; len.max(1) as usize];
    gl::GetProgramInfoLog(program, len, ptr::null_mut(), log.as_mut_ptr() as *mut _);
    gl::DeleteProgram(program);
    Err(String::from_utf8_lossy(&log).trim_end_matches('\0').to_string())
}
